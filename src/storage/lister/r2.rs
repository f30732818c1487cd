use super::{list_object_level, DirectoryLister, ObjectLevel};
use crate::storage::model::{DirectoryListing, StorageConfig, StorageError};
use crate::storage::object_store::ObjectStoreClient;
use crate::storage::url::UrlResolver;
use async_trait::async_trait;
use std::sync::Arc;

/// 与 S3 相同的列表算法，仅地址规则不同
pub struct R2Lister {
    client: Arc<dyn ObjectStoreClient>,
    bucket: String,
    folder: String,
    urls: UrlResolver,
}

impl R2Lister {
    pub fn new(client: Arc<dyn ObjectStoreClient>, config: &StorageConfig) -> Result<Self, StorageError> {
        Ok(Self {
            client,
            bucket: config.require("r2_bucket")?.to_string(),
            folder: config.get_or("r2_storage_folder", "").to_string(),
            urls: UrlResolver::for_config(config)?,
        })
    }
}

#[async_trait]
impl DirectoryLister for R2Lister {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::model::{ConfigEntry, Provider};
    use crate::storage::object_store::{LevelListing, MockObjectStoreClient, RawObject};

    #[tokio::test]
    async fn urls_use_public_domain_with_scheme() {
        let mut client = MockObjectStoreClient::new();
        client
            .expect_list_level()
            .withf(|bucket, prefix| bucket == "album" && prefix == "")
            .returning(|_, _| {
                Ok(LevelListing {
                    common_prefixes: vec!["travel/".to_string()],
                    objects: vec![
                        RawObject {
                            key: "cover.webp".to_string(),
                            size: 10,
                            last_modified: None,
                        },
                        RawObject {
                            key: "notes.md".to_string(),
                            size: 10,
                            last_modified: None,
                        },
                    ],
                })
            });

        let config = StorageConfig::new(
            Provider::R2,
            vec![
                ConfigEntry::new("r2_bucket", "album"),
                ConfigEntry::new("r2_endpoint", "https://acc.r2.cloudflarestorage.com"),
                ConfigEntry::new("r2_public_domain", "img.example.com"),
            ],
        );
        let lister = R2Lister::new(Arc::new(client), &config).unwrap();
        let listing = lister.list("", "").await.unwrap();

        assert_eq!(listing.directories, vec!["travel/".to_string()]);
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].url, "https://img.example.com/cover.webp");
    }
}
