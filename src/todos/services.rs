use std::sync::Arc;

use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateTodoRequest, UpdateTodoRequest};
use super::repo::TodoStore;
use super::repo_types::{TodoItem, TodoUpdate};
use crate::{auth::TokenVerifier, error::TodoError, storage::AttachmentStore};

/// Fixed-width UTC timestamps, so string order on the created-at index is time order.
const CREATED_AT_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Todo use-cases. Each call resolves the caller from its token and acts only on
/// that user's partition.
#[derive(Clone)]
pub struct TodoService {
    verifier: TokenVerifier,
    store: Arc<dyn TodoStore>,
    attachments: Arc<dyn AttachmentStore>,
    url_expiration_secs: u64,
}

impl TodoService {
    pub fn new(
        verifier: TokenVerifier,
        store: Arc<dyn TodoStore>,
        attachments: Arc<dyn AttachmentStore>,
        url_expiration_secs: u64,
    ) -> Self {
        Self {
            verifier,
            store,
            attachments,
            url_expiration_secs,
        }
    }

    #[instrument(skip_all)]
    pub async fn create_todo(
        &self,
        req: CreateTodoRequest,
        token: &str,
    ) -> Result<TodoItem, TodoError> {
        let user_id = self.verifier.parse_user_id(token)?;
        let created_at = OffsetDateTime::now_utc()
            .format(CREATED_AT_FORMAT)
            .map_err(anyhow::Error::from)?;
        let item = TodoItem {
            user_id,
            todo_id: Uuid::new_v4().to_string(),
            created_at,
            name: req.name,
            due_date: req.due_date,
            done: false,
            attachment_url: None,
        };
        info!(user_id = %item.user_id, todo_id = %item.todo_id, "creating todo");
        Ok(self.store.create(item).await?)
    }

    #[instrument(skip_all)]
    pub async fn list_todos(&self, token: &str) -> Result<Vec<TodoItem>, TodoError> {
        let user_id = self.verifier.parse_user_id(token)?;
        info!(%user_id, "listing todos");
        Ok(self.store.list_all(&user_id).await?)
    }

    #[instrument(skip(self, token))]
    pub async fn search_todos(
        &self,
        token: &str,
        keyword: &str,
    ) -> Result<Vec<TodoItem>, TodoError> {
        let user_id = self.verifier.parse_user_id(token)?;
        info!(%user_id, "searching todos");
        Ok(self.store.search_by_name_contains(&user_id, keyword).await?)
    }

    #[instrument(skip(self, req, token))]
    pub async fn update_todo(
        &self,
        todo_id: &str,
        req: UpdateTodoRequest,
        token: &str,
    ) -> Result<TodoUpdate, TodoError> {
        let user_id = self.verifier.parse_user_id(token)?;
        info!(%user_id, "updating todo");
        Ok(self.store.update(&user_id, todo_id, req.into()).await?)
    }

    #[instrument(skip(self, token))]
    pub async fn delete_todo(&self, todo_id: &str, token: &str) -> Result<(), TodoError> {
        let user_id = self.verifier.parse_user_id(token)?;
        info!(%user_id, "deleting todo");
        Ok(self.store.delete(&user_id, todo_id).await?)
    }

    #[instrument(skip(self, token))]
    pub async fn todo_exists(&self, todo_id: &str, token: &str) -> Result<bool, TodoError> {
        let user_id = self.verifier.parse_user_id(token)?;
        Ok(self.store.exists(&user_id, todo_id).await?)
    }

    /// Presigns an upload for `todo_id`, then records the object's public URL on the todo.
    ///
    /// A failure to record is logged and the presigned URL is still returned.
    #[instrument(skip(self, token))]
    pub async fn generate_upload_url(
        &self,
        todo_id: &str,
        token: &str,
    ) -> Result<String, TodoError> {
        let user_id = self.verifier.parse_user_id(token)?;
        let upload_url = self
            .attachments
            .presign_put(todo_id, self.url_expiration_secs)
            .await?;

        let public_url = self.attachments.public_url(todo_id);
        if let Err(e) = self
            .store
            .set_attachment_url(&user_id, todo_id, &public_url)
            .await
        {
            warn!(error = %format!("{e:#}"), %user_id, "attachment url not recorded");
        }

        info!(%user_id, "upload url issued");
        Ok(upload_url)
    }
}
