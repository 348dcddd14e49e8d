use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{presigning::PresigningConfig, Client};

/// Object storage for todo attachments.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Time-limited URL authorizing a single PUT of `key`.
    async fn presign_put(&self, key: &str, seconds: u64) -> anyhow::Result<String>;
    /// Where the object at `key` is readable once uploaded.
    fn public_url(&self, key: &str) -> String;
}

#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    pub fn new(shared: &SdkConfig, bucket: &str) -> Self {
        Self {
            client: Client::new(shared),
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl AttachmentStore for Storage {
    async fn presign_put(&self, key: &str, seconds: u64) -> anyhow::Result<String> {
        let req = self.client.put_object().bucket(&self.bucket).key(key);
        let presigned = req
            .presigned(PresigningConfig::expires_in(Duration::from_secs(seconds))?)
            .await
            .context("s3 presign_put")?;
        Ok(presigned.uri().to_string())
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(&self.bucket, key)
    }
}

pub fn public_object_url(bucket: &str, key: &str) -> String {
    format!("https://{}.s3.amazonaws.com/{}", bucket, key)
}
