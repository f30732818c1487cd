use super::{list_object_level, DirectoryLister, ObjectLevel};
use crate::storage::model::{DirectoryListing, StorageConfig, StorageError};
use crate::storage::object_store::ObjectStoreClient;
use crate::storage::url::UrlResolver;
use async_trait::async_trait;
use std::sync::Arc;

/// 腾讯云 COS，经由其 S3 兼容接口列出
pub struct CosLister {
    client: Arc<dyn ObjectStoreClient>,
    bucket: String,
    folder: String,
    urls: UrlResolver,
}

impl CosLister {
    pub fn new(client: Arc<dyn ObjectStoreClient>, config: &StorageConfig) -> Result<Self, StorageError> {
        Ok(Self {
            client,
            bucket: config.require("cos_bucket")?.to_string(),
            folder: config.get_or("cos_storage_folder", "").to_string(),
            urls: UrlResolver::for_config(config)?,
        })
    }
}

#[async_trait]
impl DirectoryLister for CosLister {
    async fn list(&self, path: &str, _prefix: &str) -> Result<DirectoryListing, StorageError> {
        list_object_level(
            self.client.as_ref(),
            ObjectLevel {
                bucket: &self.bucket,
                folder: &self.folder,
                path,
            },
            &self.urls,
        )
        .await
    }
}
