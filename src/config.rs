use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub todos_table: String,
    pub created_at_index: String,
    pub attachments_bucket: String,
    pub signed_url_expiration: u64,
    pub is_offline: bool,
    pub dynamodb_local_endpoint: String,
    pub aws_region: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| var(name).with_context(|| format!("{name} is not set"));

        let signed_url_expiration = match var("SIGNED_URL_EXPIRATION") {
            Some(v) => v
                .parse::<u64>()
                .with_context(|| format!("SIGNED_URL_EXPIRATION is not a number: {v}"))?,
            None => 300,
        };

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: var("JWT_ISSUER").filter(|v| !v.is_empty()),
            audience: var("JWT_AUDIENCE").filter(|v| !v.is_empty()),
        };

        Ok(Self {
            todos_table: required("TODOS_TABLE")?,
            created_at_index: required("TODOS_CREATED_AT_INDEX")?,
            attachments_bucket: required("ATTACHMENT_S3_BUCKET")?,
            signed_url_expiration,
            is_offline: var("IS_OFFLINE").is_some_and(|v| is_truthy(&v)),
            dynamodb_local_endpoint: var("DYNAMODB_LOCAL_ENDPOINT")
                .unwrap_or_else(|| "http://localhost:8000".into()),
            aws_region: var("AWS_REGION").unwrap_or_else(|| "us-east-1".into()),
            jwt,
        })
    }
}

fn is_truthy(v: &str) -> bool {
    !matches!(v.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "no")
}
