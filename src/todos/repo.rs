use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::{types::AttributeValue, Client};
use serde_dynamo::aws_sdk_dynamodb_1::{from_items, to_item};
use tracing::{debug, instrument};

use super::repo_types::{TodoItem, TodoUpdate};
use crate::config::AppConfig;

/// Per-user todo persistence.
///
/// Every write overwrites without a precondition: there is no existence check and no
/// version comparison, so concurrent writers race and the last one wins. `update` and
/// `set_attachment_url` upsert when the key is absent.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All of the user's todos in created-at index order, oldest first.
    async fn list_all(&self, user_id: &str) -> anyhow::Result<Vec<TodoItem>>;

    /// Same order as [`TodoStore::list_all`], keeping names that contain `substring`
    /// (case-sensitive). An empty `substring` keeps everything.
    async fn search_by_name_contains(
        &self,
        user_id: &str,
        substring: &str,
    ) -> anyhow::Result<Vec<TodoItem>>;

    async fn create(&self, item: TodoItem) -> anyhow::Result<TodoItem>;

    async fn update(
        &self,
        user_id: &str,
        todo_id: &str,
        update: TodoUpdate,
    ) -> anyhow::Result<TodoUpdate>;

    async fn exists(&self, user_id: &str, todo_id: &str) -> anyhow::Result<bool>;

    /// Idempotent.
    async fn delete(&self, user_id: &str, todo_id: &str) -> anyhow::Result<()>;

    async fn set_attachment_url(
        &self,
        user_id: &str,
        todo_id: &str,
        url: &str,
    ) -> anyhow::Result<()>;
}

const UPDATE_FIELDS: &str = "SET #todo_name = :name, dueDate = :dueDate, done = :done";
const SET_ATTACHMENT: &str = "SET attachmentUrl = :attachmentUrl";
const BY_USER: &str = "userId = :userId";
const NAME_CONTAINS: &str = "contains(#todo_name, :name)";

/// Todo table in DynamoDB, partitioned by `userId` with sort key `todoId` and a
/// secondary index ordered by `createdAt`.
#[derive(Clone)]
pub struct DynamoTodoStore {
    client: Client,
    table: String,
    created_at_index: String,
}

impl DynamoTodoStore {
    pub fn new(shared: &SdkConfig, config: &AppConfig) -> Self {
        let mut conf = aws_sdk_dynamodb::config::Builder::from(shared);
        if config.is_offline {
            debug!(endpoint = %config.dynamodb_local_endpoint, "using local dynamodb");
            conf = conf.endpoint_url(&config.dynamodb_local_endpoint);
        }
        Self {
            client: Client::from_conf(conf.build()),
            table: config.todos_table.clone(),
            created_at_index: config.created_at_index.clone(),
        }
    }

    async fn query_by_created_at(
        &self,
        user_id: &str,
        name_contains: Option<&str>,
    ) -> anyhow::Result<Vec<TodoItem>> {
        let mut items = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let mut query = self
                .client
                .query()
                .table_name(&self.table)
                .index_name(&self.created_at_index)
                .key_condition_expression(BY_USER)
                .expression_attribute_values(":userId", AttributeValue::S(user_id.to_owned()))
                .scan_index_forward(true)
                .set_exclusive_start_key(exclusive_start_key.take());

            if let Some(substring) = name_contains {
                query = query
                    .filter_expression(NAME_CONTAINS)
                    .expression_attribute_names("#todo_name", "name")
                    .expression_attribute_values(":name", AttributeValue::S(substring.to_owned()));
            }

            let response = query.send().await.context("dynamodb query")?;
            let page: Vec<TodoItem> =
                from_items(response.items.unwrap_or_default()).context("decode todo items")?;
            items.extend(page);

            match response.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }
}

fn todo_key(user_id: &str, todo_id: &str) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("userId".to_owned(), AttributeValue::S(user_id.to_owned())),
        ("todoId".to_owned(), AttributeValue::S(todo_id.to_owned())),
    ])
}

#[async_trait]
impl TodoStore for DynamoTodoStore {
    #[instrument(skip(self))]
    async fn list_all(&self, user_id: &str) -> anyhow::Result<Vec<TodoItem>> {
        self.query_by_created_at(user_id, None).await
    }

    #[instrument(skip(self))]
    async fn search_by_name_contains(
        &self,
        user_id: &str,
        substring: &str,
    ) -> anyhow::Result<Vec<TodoItem>> {
        if substring.is_empty() {
            return self.list_all(user_id).await;
        }
        self.query_by_created_at(user_id, Some(substring)).await
    }

    #[instrument(skip(self, item), fields(user_id = %item.user_id, todo_id = %item.todo_id))]
    async fn create(&self, item: TodoItem) -> anyhow::Result<TodoItem> {
        let attrs: HashMap<String, AttributeValue> =
            to_item(&item).context("encode todo item")?;
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(attrs))
            .send()
            .await
            .context("dynamodb put_item")?;
        Ok(item)
    }

    #[instrument(skip(self, update))]
    async fn update(
        &self,
        user_id: &str,
        todo_id: &str,
        update: TodoUpdate,
    ) -> anyhow::Result<TodoUpdate> {
        self.client
            .update_item()
            .table_name(&self.table)
            .set_key(Some(todo_key(user_id, todo_id)))
            .update_expression(UPDATE_FIELDS)
            .expression_attribute_names("#todo_name", "name")
            .expression_attribute_values(":name", AttributeValue::S(update.name.clone()))
            .expression_attribute_values(":dueDate", AttributeValue::S(update.due_date.clone()))
            .expression_attribute_values(":done", AttributeValue::Bool(update.done))
            .send()
            .await
            .context("dynamodb update_item")?;
        Ok(update)
    }

    #[instrument(skip(self))]
    async fn exists(&self, user_id: &str, todo_id: &str) -> anyhow::Result<bool> {
        let res = self
            .client
            .get_item()
            .table_name(&self.table)
            .set_key(Some(todo_key(user_id, todo_id)))
            .consistent_read(true)
            .send()
            .await
            .context("dynamodb get_item")?;
        Ok(res.item().is_some())
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: &str, todo_id: &str) -> anyhow::Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .set_key(Some(todo_key(user_id, todo_id)))
            .send()
            .await
            .context("dynamodb delete_item")?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_attachment_url(
        &self,
        user_id: &str,
        todo_id: &str,
        url: &str,
    ) -> anyhow::Result<()> {
        self.client
            .update_item()
            .table_name(&self.table)
            .set_key(Some(todo_key(user_id, todo_id)))
            .update_expression(SET_ATTACHMENT)
            .expression_attribute_values(":attachmentUrl", AttributeValue::S(url.to_owned()))
            .send()
            .await
            .context("dynamodb update_item attachmentUrl")?;
        Ok(())
    }
}
