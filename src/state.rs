use crate::auth::TokenVerifier;
use crate::config::AppConfig;
use crate::storage::{AttachmentStore, Storage};
use crate::todos::{DynamoTodoStore, TodoService, TodoStore};
use aws_config::{defaults, BehaviorVersion, Region};
use aws_credential_types::Credentials;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub todos: TodoService,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let mut loader =
            defaults(BehaviorVersion::latest()).region(Region::new(config.aws_region.clone()));
        if config.is_offline {
            // DynamoDB Local accepts any credentials
            loader = loader.credentials_provider(Credentials::new(
                "local", "local", None, None, "static",
            ));
        }
        let shared = loader.load().await;

        let store = Arc::new(DynamoTodoStore::new(&shared, &config)) as Arc<dyn TodoStore>;
        let attachments =
            Arc::new(Storage::new(&shared, &config.attachments_bucket)) as Arc<dyn AttachmentStore>;

        Ok(Self::from_parts(config, store, attachments))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn TodoStore>,
        attachments: Arc<dyn AttachmentStore>,
    ) -> Self {
        let todos = TodoService::new(
            TokenVerifier::new(&config.jwt),
            store,
            attachments,
            config.signed_url_expiration,
        );
        Self { config, todos }
    }

    #[cfg(test)]
    pub fn for_tests(store: Arc<dyn TodoStore>, attachments: Arc<dyn AttachmentStore>) -> Self {
        let config = Arc::new(AppConfig {
            todos_table: "Todos-test".into(),
            created_at_index: "CreatedAtIndex".into(),
            attachments_bucket: "fake-bucket".into(),
            signed_url_expiration: 300,
            is_offline: true,
            dynamodb_local_endpoint: "http://localhost:8000".into(),
            aws_region: "us-east-1".into(),
            jwt: crate::auth::jwt::testing::jwt_config(),
        });
        Self::from_parts(config, store, attachments)
    }
}
