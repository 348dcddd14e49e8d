use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Failures surfaced by the todo use-cases.
#[derive(Debug, Error)]
pub enum TodoError {
    /// The bearer token could not be parsed or lacks the user claim.
    #[error("malformed token: {0}")]
    Decode(String),

    /// The token parsed but failed verification.
    #[error("unauthorized: {0}")]
    Auth(String),

    #[error("todo not found")]
    NotFound,

    /// Item table or object storage failure.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// HTTP shape of a [`TodoError`]. The only place errors become status codes.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: &'static str,
}

impl ApiError {
    pub fn unauthorized(message: &'static str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message,
        }
    }
}

impl From<TodoError> for ApiError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::Decode(reason) => {
                warn!(%reason, "rejecting malformed token");
                Self::unauthorized("Invalid token")
            }
            TodoError::Auth(reason) => {
                warn!(%reason, "rejecting unverified token");
                Self::unauthorized("Unauthorized")
            }
            TodoError::NotFound => Self {
                status: StatusCode::NOT_FOUND,
                message: "Todo not found",
            },
            TodoError::Store(e) => {
                error!(error = %format!("{e:#}"), "store operation failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal server error",
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
