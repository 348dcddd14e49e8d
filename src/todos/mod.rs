mod dto;
pub mod handlers;
#[cfg(test)]
pub(crate) mod memory;
pub mod repo;
mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use repo::{DynamoTodoStore, TodoStore};
pub use services::TodoService;

pub fn router() -> Router<AppState> {
    handlers::todo_routes()
}
