use serde::{Deserialize, Serialize};

use super::repo_types::{TodoItem, TodoUpdate};

/// `POST /todos` body. Unknown fields such as `priority` are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub name: String,
    pub due_date: String,
}

/// `PATCH /todos/:todoId` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub name: String,
    pub due_date: String,
    pub done: bool,
}

impl From<UpdateTodoRequest> for TodoUpdate {
    fn from(r: UpdateTodoRequest) -> Self {
        Self {
            name: r.name,
            due_date: r.due_date,
            done: r.done,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    pub items: Vec<TodoItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
}
