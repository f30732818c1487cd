use crate::storage::model::StorageError;
use std::future::Future;
use std::time::Duration;

/// 为单次远程调用加上统一的超时，超时按远程错误处理
pub async fn with_timeout<T, F>(limit: Duration, what: &str, fut: F) -> Result<T, StorageError>
where
    F: Future<Output = Result<T, StorageError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::RemoteProvider(format!(
            "{} 超时（{} 秒）",
            what,
            limit.as_secs()
        ))),
    }
}
