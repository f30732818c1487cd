use crate::db::configs::ConfigStore;
use crate::storage::lister::{AlistLister, CosLister, DirectoryLister, R2Lister, S3Lister};
use crate::storage::model::{DirectoryListing, Provider, StorageConfig, StorageError};
use crate::storage::registry::{ProviderClient, ProviderRegistry};
use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

/// 各提供方是否已完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StorageStatus {
    pub s3: bool,
    pub r2: bool,
    pub cos: bool,
    pub alist: bool,
}

pub struct StorageManager {
    configs: Arc<dyn ConfigStore>,
    registry: ProviderRegistry,
    alist_concurrency: usize,
}

impl StorageManager {
    pub fn new(configs: Arc<dyn ConfigStore>, registry: ProviderRegistry, alist_concurrency: usize) -> Self {
        Self {
            configs,
            registry,
            alist_concurrency,
        }
    }

    /// 每次请求重新读取配置，不做缓存
    pub async fn load_config(&self, provider: Provider) -> Result<StorageConfig, StorageError> {
        let entries = self
            .configs
            .fetch_configs_by_keys(provider.config_keys())
            .await?;
        Ok(StorageConfig::new(provider, entries))
    }

    /// 根据提供方选择列表适配器
    pub async fn lister(&self, provider: Provider) -> Result<Box<dyn DirectoryLister>, StorageError> {
        let config = self.load_config(provider).await?;
        let client = self.registry.get_client(&config).await?;

        let lister: Box<dyn DirectoryLister> = match (provider, client) {
            (Provider::S3, ProviderClient::Object(c)) => Box::new(S3Lister::new(c, &config)?),
            (Provider::R2, ProviderClient::Object(c)) => Box::new(R2Lister::new(c, &config)?),
            (Provider::Cos, ProviderClient::Object(c)) => Box::new(CosLister::new(c, &config)?),
            (Provider::Alist, ProviderClient::Alist(api)) => {
                Box::new(AlistLister::new(api, &config, self.alist_concurrency)?)
            }
            (provider, _) => {
                return Err(StorageError::Configuration(format!(
                    "{} 客户端类型不匹配",
                    provider
                )))
            }
        };
        Ok(lister)
    }

    /// 浏览目录
    pub async fn browse(&self, storage: &str, path: &str, prefix: &str) -> Result<DirectoryListing, StorageError> {
        let provider: Provider = storage.parse()?;
        info!("浏览目录 - 存储: {}, 路径: {}, 前缀: {}", provider, path, prefix);

        let listing = self.lister(provider).await?.list(path, prefix).await?;
        debug!(
            "目录 {} 下有 {} 个子目录, {} 个图片",
            path,
            listing.directories.len(),
            listing.files.len()
        );
        Ok(listing)
    }

    /// 配置完整性，每次请求重新计算
    pub async fn status(&self) -> Result<StorageStatus, StorageError> {
        let mut status = StorageStatus::default();
        for provider in Provider::ALL {
            let configured = self.load_config(provider).await?.is_configured();
            match provider {
                Provider::S3 => status.s3 = configured,
                Provider::R2 => status.r2 = configured,
                Provider::Cos => status.cos = configured,
                Provider::Alist => status.alist = configured,
            }
        }
        Ok(status)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::model::ConfigEntry;
    use crate::storage::object_store::{LevelListing, MockObjectStoreClient, RawObject};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// 内存配置表
    #[derive(Default)]
    pub struct MemoryConfigStore {
        pub values: Mutex<HashMap<String, String>>,
    }

    impl MemoryConfigStore {
        pub fn with(pairs: &[(&str, &str)]) -> Self {
            let store = Self::default();
            {
                let mut values = store.values.lock().unwrap();
                for (k, v) in pairs {
                    values.insert(k.to_string(), v.to_string());
                }
            }
            store
        }
    }

    #[async_trait]
    impl ConfigStore for MemoryConfigStore {
        async fn fetch_configs_by_keys(&self, keys: &[&str]) -> Result<Vec<ConfigEntry>, StorageError> {
            let values = self.values.lock().unwrap();
            Ok(keys
                .iter()
                .filter_map(|k| values.get(*k).map(|v| ConfigEntry::new(k, v)))
                .collect())
        }
    }

    pub const S3_KEYS: &[(&str, &str)] = &[
        ("accesskey_id", "id"),
        ("accesskey_secret", "secret"),
        ("endpoint", "s3.example.com"),
        ("bucket", "pics"),
    ];

    pub fn bucket_client() -> MockObjectStoreClient {
        let mut client = MockObjectStoreClient::new();
        client.expect_list_level().returning(|_, prefix| {
            if prefix == "photos/" {
                Ok(LevelListing {
                    common_prefixes: vec!["photos/2023/".to_string()],
                    objects: vec![
                        RawObject {
                            key: "photos/a.jpg".to_string(),
                            size: 100,
                            last_modified: None,
                        },
                        RawObject {
                            key: "photos/b.txt".to_string(),
                            size: 5,
                            last_modified: None,
                        },
                    ],
                })
            } else {
                Ok(LevelListing {
                    common_prefixes: vec!["photos/".to_string()],
                    objects: vec![],
                })
            }
        });
        client
    }

    pub async fn s3_manager(store: MemoryConfigStore) -> StorageManager {
        let registry = ProviderRegistry::new(Duration::from_secs(15));
        registry
            .insert(Provider::S3, ProviderClient::Object(Arc::new(bucket_client())))
            .await;
        StorageManager::new(Arc::new(store), registry, 4)
    }

    #[tokio::test]
    async fn browse_s3_bucket_scenario() {
        let manager = s3_manager(MemoryConfigStore::with(S3_KEYS)).await;
        let listing = manager.browse("s3", "photos/", "").await.unwrap();

        assert_eq!(listing.directories, vec!["photos/2023/".to_string()]);
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].name, "a.jpg");
        assert!(listing.files[0].url.starts_with("https://"));
    }

    #[tokio::test]
    async fn config_is_reread_on_every_request() {
        let manager = s3_manager(MemoryConfigStore::with(S3_KEYS)).await;
        assert!(manager.browse("s3", "", "").await.is_ok());

        // 删除 bucket 后下一次请求立即变为配置错误
        let store = MemoryConfigStore::with(&S3_KEYS[..3]);
        let manager = StorageManager {
            configs: Arc::new(store),
            ..manager
        };
        let result = manager.browse("s3", "", "").await;
        assert!(matches!(result, Err(StorageError::Configuration(_))));
    }

    #[tokio::test]
    async fn unknown_provider_is_rejected() {
        let manager = s3_manager(MemoryConfigStore::default()).await;
        assert!(matches!(
            manager.browse("ftp", "", "").await,
            Err(StorageError::UnsupportedProvider(_))
        ));
    }

    #[tokio::test]
    async fn status_reflects_required_keys() {
        let manager = s3_manager(MemoryConfigStore::with(&[
            ("accesskey_id", "id"),
            ("accesskey_secret", "secret"),
            ("endpoint", "s3.example.com"),
            ("bucket", "pics"),
            ("alist_url", "https://alist.example.com"),
            ("alist_token", ""),
        ]))
        .await;

        let status = manager.status().await.unwrap();
        assert_eq!(
            status,
            StorageStatus {
                s3: true,
                r2: false,
                cos: false,
                alist: false,
            }
        );
    }
}
