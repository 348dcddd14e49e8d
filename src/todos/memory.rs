use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::repo::TodoStore;
use super::repo_types::{TodoItem, TodoUpdate};

/// Record as the table sees it: upserts may create rows missing most attributes.
#[derive(Debug, Clone, Default)]
struct Row {
    created_at: Option<String>,
    name: Option<String>,
    due_date: Option<String>,
    done: Option<bool>,
    attachment_url: Option<String>,
    seq: u64,
}

/// In-process [`TodoStore`] with the table's semantics, used by tests.
#[derive(Default)]
pub struct MemoryTodoStore {
    rows: RwLock<(u64, HashMap<(String, String), Row>)>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows reachable through the created-at index, oldest first.
    async fn indexed(&self, user_id: &str) -> Vec<TodoItem> {
        let guard = self.rows.read().await;
        let mut rows: Vec<_> = guard
            .1
            .iter()
            .filter(|((uid, _), row)| uid == user_id && row.created_at.is_some())
            .collect();
        rows.sort_by(|(_, a), (_, b)| a.created_at.cmp(&b.created_at).then(a.seq.cmp(&b.seq)));
        rows.into_iter()
            .map(|((uid, tid), row)| TodoItem {
                user_id: uid.clone(),
                todo_id: tid.clone(),
                created_at: row.created_at.clone().unwrap_or_default(),
                name: row.name.clone().unwrap_or_default(),
                due_date: row.due_date.clone().unwrap_or_default(),
                done: row.done.unwrap_or_default(),
                attachment_url: row.attachment_url.clone(),
            })
            .collect()
    }

    async fn upsert<F: FnOnce(&mut Row)>(&self, user_id: &str, todo_id: &str, apply: F) {
        let mut guard = self.rows.write().await;
        let (next_seq, rows) = &mut *guard;
        let row = rows
            .entry((user_id.to_owned(), todo_id.to_owned()))
            .or_insert_with(|| {
                *next_seq += 1;
                Row {
                    seq: *next_seq,
                    ..Row::default()
                }
            });
        apply(row);
    }

    pub async fn get(&self, user_id: &str, todo_id: &str) -> Option<TodoItem> {
        self.indexed(user_id)
            .await
            .into_iter()
            .find(|item| item.todo_id == todo_id)
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn list_all(&self, user_id: &str) -> anyhow::Result<Vec<TodoItem>> {
        Ok(self.indexed(user_id).await)
    }

    async fn search_by_name_contains(
        &self,
        user_id: &str,
        substring: &str,
    ) -> anyhow::Result<Vec<TodoItem>> {
        let mut items = self.indexed(user_id).await;
        items.retain(|item| item.name.contains(substring));
        Ok(items)
    }

    async fn create(&self, item: TodoItem) -> anyhow::Result<TodoItem> {
        let mut guard = self.rows.write().await;
        let (next_seq, rows) = &mut *guard;
        *next_seq += 1;
        rows.insert(
            (item.user_id.clone(), item.todo_id.clone()),
            Row {
                created_at: Some(item.created_at.clone()),
                name: Some(item.name.clone()),
                due_date: Some(item.due_date.clone()),
                done: Some(item.done),
                attachment_url: item.attachment_url.clone(),
                seq: *next_seq,
            },
        );
        Ok(item)
    }

    async fn update(
        &self,
        user_id: &str,
        todo_id: &str,
        update: TodoUpdate,
    ) -> anyhow::Result<TodoUpdate> {
        let u = update.clone();
        self.upsert(user_id, todo_id, move |row| {
            row.name = Some(u.name);
            row.due_date = Some(u.due_date);
            row.done = Some(u.done);
        })
        .await;
        Ok(update)
    }

    async fn exists(&self, user_id: &str, todo_id: &str) -> anyhow::Result<bool> {
        let guard = self.rows.read().await;
        Ok(guard
            .1
            .contains_key(&(user_id.to_owned(), todo_id.to_owned())))
    }

    async fn delete(&self, user_id: &str, todo_id: &str) -> anyhow::Result<()> {
        let mut guard = self.rows.write().await;
        guard.1.remove(&(user_id.to_owned(), todo_id.to_owned()));
        Ok(())
    }

    async fn set_attachment_url(
        &self,
        user_id: &str,
        todo_id: &str,
        url: &str,
    ) -> anyhow::Result<()> {
        let url = url.to_owned();
        self.upsert(user_id, todo_id, move |row| row.attachment_url = Some(url))
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(user: &str, id: &str, created_at: &str, name: &str) -> TodoItem {
        TodoItem {
            user_id: user.into(),
            todo_id: id.into(),
            created_at: created_at.into(),
            name: name.into(),
            due_date: "2024-01-01".into(),
            done: false,
            attachment_url: None,
        }
    }

    #[tokio::test]
    async fn lists_by_created_at_within_user() {
        let store = MemoryTodoStore::new();
        store.create(item("u1", "b", "2024-01-02T00:00:00Z", "second")).await.unwrap();
        store.create(item("u1", "a", "2024-01-01T00:00:00Z", "first")).await.unwrap();
        store.create(item("u2", "c", "2023-01-01T00:00:00Z", "other")).await.unwrap();

        let names: Vec<_> = store
            .list_all("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, ["first", "second"]);
        assert!(store.list_all("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_is_case_sensitive_substring() {
        let store = MemoryTodoStore::new();
        store.create(item("u1", "a", "1", "Buy milk")).await.unwrap();
        store.create(item("u1", "b", "2", "buy bread")).await.unwrap();

        let hits = store.search_by_name_contains("u1", "Buy").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].todo_id, "a");
        assert_eq!(
            store.search_by_name_contains("u1", "").await.unwrap(),
            store.list_all("u1").await.unwrap()
        );
    }

    #[tokio::test]
    async fn update_of_missing_key_upserts_outside_index() {
        let store = MemoryTodoStore::new();
        let update = TodoUpdate {
            name: "ghost".into(),
            due_date: "2024-01-01".into(),
            done: true,
        };
        store.update("u1", "missing", update).await.unwrap();
        assert!(store.exists("u1", "missing").await.unwrap());
        assert!(store.list_all("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryTodoStore::new();
        store.create(item("u1", "a", "1", "x")).await.unwrap();
        store.delete("u1", "a").await.unwrap();
        store.delete("u1", "a").await.unwrap();
        assert!(!store.exists("u1", "a").await.unwrap());
    }
}
