use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{instrument, warn};

use super::dto::{
    CreateTodoRequest, SearchQuery, TodoListResponse, UpdateTodoRequest, UploadUrlResponse,
};
use super::repo_types::{TodoItem, TodoUpdate};
use crate::{
    auth::BearerToken,
    error::{ApiError, TodoError},
    state::AppState,
};

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:todo_id", patch(update_todo).delete(delete_todo))
        .route("/todos/:todo_id/attachment", post(generate_upload_url))
}

#[instrument(skip_all)]
pub async fn create_todo(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(body): Json<CreateTodoRequest>,
) -> Result<Json<TodoItem>, ApiError> {
    let item = state.todos.create_todo(body, &token).await?;
    Ok(Json(item))
}

#[instrument(skip(state, token))]
pub async fn list_todos(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Query(q): Query<SearchQuery>,
) -> Result<Json<TodoListResponse>, ApiError> {
    let items = match q.keyword {
        Some(keyword) => state.todos.search_todos(&token, &keyword).await?,
        None => state.todos.list_todos(&token).await?,
    };
    Ok(Json(TodoListResponse { items }))
}

#[instrument(skip(state, token, body))]
pub async fn update_todo(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(todo_id): Path<String>,
    Json(body): Json<UpdateTodoRequest>,
) -> Result<Json<TodoUpdate>, ApiError> {
    ensure_exists(&state, &todo_id, &token).await?;
    let updated = state.todos.update_todo(&todo_id, body, &token).await?;
    Ok(Json(updated))
}

#[instrument(skip(state, token))]
pub async fn delete_todo(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(todo_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.todos.delete_todo(&todo_id, &token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, token))]
pub async fn generate_upload_url(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(todo_id): Path<String>,
) -> Result<Json<UploadUrlResponse>, ApiError> {
    ensure_exists(&state, &todo_id, &token).await?;
    let upload_url = state.todos.generate_upload_url(&todo_id, &token).await?;
    Ok(Json(UploadUrlResponse { upload_url }))
}

async fn ensure_exists(state: &AppState, todo_id: &str, token: &str) -> Result<(), TodoError> {
    if state.todos.todo_exists(todo_id, token).await? {
        Ok(())
    } else {
        warn!(%todo_id, "todo not found");
        Err(TodoError::NotFound)
    }
}
