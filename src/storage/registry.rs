use crate::storage::alist_client::{AlistApi, HttpAlistClient};
use crate::storage::model::{Provider, StorageConfig, StorageError};
use crate::storage::object_store::{ConnectOptions, ObjectStoreClient, S3ObjectClient};
use crate::storage::url::ensure_scheme;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// 某个提供方的共享客户端
#[derive(Clone)]
pub enum ProviderClient {
    Object(Arc<dyn ObjectStoreClient>),
    Alist(Arc<dyn AlistApi>),
}

/// 按提供方缓存客户端，进程内首次使用时创建，直到进程退出
pub struct ProviderRegistry {
    clients: Mutex<HashMap<Provider, ProviderClient>>,
    timeout: Duration,
}

impl ProviderRegistry {
    pub fn new(timeout: Duration) -> Self {
        info!("初始化存储客户端注册表");
        Self {
            clients: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// 预先放入假客户端
    #[cfg(test)]
    pub async fn insert(&self, provider: Provider, client: ProviderClient) {
        self.clients.lock().await.insert(provider, client);
    }

    pub async fn get_client(&self, config: &StorageConfig) -> Result<ProviderClient, StorageError> {
        let provider = config.provider();

        // 必填项缺失属于调用方可处理的错误，在任何网络调用之前返回
        config.ensure_configured()?;

        let mut clients = self.clients.lock().await;
        if let Some(client) = clients.get(&provider) {
            debug!("复用已缓存的 {} 客户端", provider);
            return Ok(client.clone());
        }

        let client = self.build(config).await?;
        info!("已创建 {} 客户端", provider);
        clients.insert(provider, client.clone());
        Ok(client)
    }

    async fn build(&self, config: &StorageConfig) -> Result<ProviderClient, StorageError> {
        match config.provider() {
            Provider::Alist => Ok(ProviderClient::Alist(Arc::new(HttpAlistClient::new(
                self.timeout,
            )?))),
            _ => {
                let options = connect_options(config)?;
                debug!(
                    "连接对象存储 - 提供方: {}, endpoint: {}, region: {}",
                    config.provider(),
                    options.endpoint,
                    options.region
                );
                Ok(ProviderClient::Object(Arc::new(
                    S3ObjectClient::connect(options, self.timeout).await,
                )))
            }
        }
    }
}

/// 从配置派生 S3 兼容客户端参数
pub fn connect_options(config: &StorageConfig) -> Result<ConnectOptions, StorageError> {
    match config.provider() {
        Provider::S3 => Ok(ConnectOptions {
            endpoint: ensure_scheme(config.require("endpoint")?),
            region: config.get_or("region", "us-east-1").to_string(),
            access_key: config.require("accesskey_id")?.to_string(),
            secret_key: config.require("accesskey_secret")?.to_string(),
            force_path_style: config.flag("force_path_style"),
        }),
        Provider::R2 => Ok(ConnectOptions {
            endpoint: ensure_scheme(config.require("r2_endpoint")?),
            region: "auto".to_string(),
            access_key: config.require("r2_accesskey_id")?.to_string(),
            secret_key: config.require("r2_accesskey_secret")?.to_string(),
            force_path_style: true,
        }),
        Provider::Cos => {
            let region = config.require("cos_region")?;
            Ok(ConnectOptions {
                endpoint: format!("https://cos.{}.myqcloud.com", region),
                region: region.to_string(),
                access_key: config.require("cos_secret_id")?.to_string(),
                secret_key: config.require("cos_secret_key")?.to_string(),
                force_path_style: false,
            })
        }
        Provider::Alist => Err(StorageError::Configuration(
            "AList 不是对象存储".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::model::ConfigEntry;
    use crate::storage::object_store::MockObjectStoreClient;

    fn r2_config() -> StorageConfig {
        StorageConfig::new(
            Provider::R2,
            vec![
                ConfigEntry::new("r2_accesskey_id", "id"),
                ConfigEntry::new("r2_accesskey_secret", "secret"),
                ConfigEntry::new("r2_endpoint", "acc.r2.cloudflarestorage.com"),
                ConfigEntry::new("r2_bucket", "album"),
            ],
        )
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_construction() {
        let registry = ProviderRegistry::new(Duration::from_secs(15));
        let config = StorageConfig::new(Provider::S3, vec![ConfigEntry::new("bucket", "pics")]);

        let result = registry.get_client(&config).await;
        assert!(matches!(result, Err(StorageError::Configuration(_))));
    }

    #[tokio::test]
    async fn memoized_client_is_reused() {
        let registry = ProviderRegistry::new(Duration::from_secs(15));
        let injected: Arc<dyn ObjectStoreClient> = Arc::new(MockObjectStoreClient::new());
        registry
            .insert(Provider::R2, ProviderClient::Object(injected.clone()))
            .await;

        let first = registry.get_client(&r2_config()).await.unwrap();
        let second = registry.get_client(&r2_config()).await.unwrap();
        match (first, second) {
            (ProviderClient::Object(a), ProviderClient::Object(b)) => {
                assert!(Arc::ptr_eq(&a, &injected));
                assert!(Arc::ptr_eq(&a, &b));
            }
            _ => panic!("R2 应当得到对象存储客户端"),
        }
    }

    #[test]
    fn connect_options_per_provider() {
        let r2 = connect_options(&r2_config()).unwrap();
        assert_eq!(r2.endpoint, "https://acc.r2.cloudflarestorage.com");
        assert_eq!(r2.region, "auto");
        assert!(r2.force_path_style);

        let cos = connect_options(&StorageConfig::new(
            Provider::Cos,
            vec![
                ConfigEntry::new("cos_secret_id", "id"),
                ConfigEntry::new("cos_secret_key", "key"),
                ConfigEntry::new("cos_region", "ap-beijing"),
                ConfigEntry::new("cos_bucket", "b-125"),
            ],
        ))
        .unwrap();
        assert_eq!(cos.endpoint, "https://cos.ap-beijing.myqcloud.com");
        assert!(!cos.force_path_style);
    }
}
