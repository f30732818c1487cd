use crate::storage::model::{ConfigEntry, StorageError};
use async_trait::async_trait;
use log::debug;
use sqlx::PgPool;

/// 配置表，对本服务只读
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn fetch_configs_by_keys(&self, keys: &[&str]) -> Result<Vec<ConfigEntry>, StorageError>;
}

pub struct PgConfigStore {
    pool: PgPool,
}

impl PgConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigStore for PgConfigStore {
    async fn fetch_configs_by_keys(&self, keys: &[&str]) -> Result<Vec<ConfigEntry>, StorageError> {
        debug!("读取配置项: {:?}", keys);
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();

        sqlx::query_as::<_, ConfigEntry>(
            r#"
            SELECT config_key, config_value FROM configs WHERE config_key = ANY($1)
            "#,
        )
        .bind(keys)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::ConfigStore(format!("查询配置失败: {}", e)))
    }
}
