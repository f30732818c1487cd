use crate::storage::model::StorageError;
use crate::storage::remote::with_timeout;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use log::debug;
use std::time::Duration;

/// 对象存储单层列表中的一个对象
#[derive(Debug, Clone, PartialEq)]
pub struct RawObject {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// 以 "/" 为分隔符的一层列表原始结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelListing {
    pub common_prefixes: Vec<String>,
    pub objects: Vec<RawObject>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// 列出 prefix 下一层的公共前缀与对象
    async fn list_level(&self, bucket: &str, prefix: &str) -> Result<LevelListing, StorageError>;
}

/// 建立 S3 兼容客户端所需的参数
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub force_path_style: bool,
}

/// 基于 aws-sdk-s3 的实现，S3 / R2 / COS 共用
pub struct S3ObjectClient {
    client: Client,
    timeout: Duration,
}

impl S3ObjectClient {
    pub async fn connect(options: ConnectOptions, timeout: Duration) -> Self {
        let credentials = Credentials::new(
            options.access_key,
            options.secret_key,
            None,
            None,
            "gallery-storage",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(options.region))
            .credentials_provider(credentials)
            .endpoint_url(options.endpoint.trim_end_matches('/'))
            .load()
            .await;
        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(options.force_path_style)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            timeout,
        }
    }
}

#[async_trait]
impl ObjectStoreClient for S3ObjectClient {
    async fn list_level(&self, bucket: &str, prefix: &str) -> Result<LevelListing, StorageError> {
        let mut listing = LevelListing::default();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .delimiter("/");

            if let Some(token) = continuation_token.take() {
                req = req.continuation_token(token);
            }

            let resp = with_timeout(self.timeout, "列出存储桶内容", async {
                req.send().await.map_err(|e| {
                    StorageError::RemoteProvider(format!(
                        "list {}/{}: {}",
                        bucket,
                        prefix,
                        DisplayErrorContext(&e)
                    ))
                })
            })
            .await?;

            for common in resp.common_prefixes() {
                if let Some(p) = common.prefix() {
                    listing.common_prefixes.push(p.to_string());
                }
            }

            for obj in resp.contents() {
                if let Some(key) = obj.key() {
                    listing.objects.push(RawObject {
                        key: key.to_string(),
                        size: obj.size().unwrap_or(0),
                        last_modified: obj
                            .last_modified()
                            .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos())),
                    });
                }
            }

            if resp.is_truncated() == Some(true) {
                continuation_token = resp.next_continuation_token().map(|s| s.to_string());
                if continuation_token.is_none() {
                    break;
                }
                debug!("列表被截断，继续获取下一页: {}", prefix);
            } else {
                break;
            }
        }

        Ok(listing)
    }
}
