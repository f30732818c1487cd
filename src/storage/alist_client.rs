use crate::storage::model::StorageError;
use crate::storage::remote::with_timeout;
use async_trait::async_trait;
use log::{debug, warn};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use std::time::Duration;

/// AList 文件类型：图片
pub const ALIST_TYPE_IMAGE: i64 = 5;
/// AList 文件类型：未知
pub const ALIST_TYPE_UNKNOWN: i64 = 0;

/// 当前请求所用的 AList 地址与令牌，每次请求从配置表读取
#[derive(Debug, Clone, PartialEq)]
pub struct AlistEndpoint {
    pub base_url: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AlistEntry {
    pub name: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default, alias = "thumb_url")]
    pub thumb: String,
    #[serde(rename = "type", default)]
    pub kind: i64,
}

#[derive(Debug, Deserialize)]
struct AlistResponse<T> {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct FsListData {
    #[serde(default)]
    content: Option<Vec<AlistEntry>>,
}

#[derive(Debug, Deserialize)]
struct FsGetData {
    #[serde(default)]
    raw_url: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlistApi: Send + Sync {
    /// POST /api/fs/list
    async fn list_dir(&self, endpoint: &AlistEndpoint, path: &str) -> Result<Vec<AlistEntry>, StorageError>;

    /// POST /api/fs/get，返回 raw_url（为空时返回 None）
    async fn raw_url(&self, endpoint: &AlistEndpoint, path: &str) -> Result<Option<String>, StorageError>;
}

/// 基于 reqwest 的 AList 客户端，连接池在进程内复用
pub struct HttpAlistClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpAlistClient {
    pub fn new(timeout: Duration) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::RemoteProvider(format!("创建 AList HTTP 客户端失败: {}", e)))?;
        Ok(Self { http, timeout })
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &AlistEndpoint,
        api: &str,
        path: &str,
    ) -> Result<Option<T>, StorageError> {
        let url = format!("{}{}", endpoint.base_url.trim_end_matches('/'), api);
        debug!("请求 AList: {} - 路径: {}", api, path);

        let body = json!({
            "path": path,
            "password": "",
            "page": 1,
            "per_page": 0,
            "refresh": false,
        });

        let resp: AlistResponse<T> = with_timeout(self.timeout, "请求 AList", async {
            self.http
                .post(&url)
                .header("Authorization", &endpoint.token)
                .json(&body)
                .send()
                .await
                .map_err(|e| StorageError::RemoteProvider(format!("请求 AList 失败: {}", e)))?
                .json::<AlistResponse<T>>()
                .await
                .map_err(|e| StorageError::RemoteProvider(format!("解析 AList 响应失败: {}", e)))
        })
        .await?;

        if resp.code != 200 {
            warn!("AList 返回错误 - 接口: {}, code: {}, message: {}", api, resp.code, resp.message);
            let message = if resp.message.is_empty() {
                format!("AList 请求失败（code {}）", resp.code)
            } else {
                resp.message
            };
            return Err(StorageError::RemoteProvider(message));
        }

        Ok(resp.data)
    }
}

#[async_trait]
impl AlistApi for HttpAlistClient {
    async fn list_dir(&self, endpoint: &AlistEndpoint, path: &str) -> Result<Vec<AlistEntry>, StorageError> {
        let data: Option<FsListData> = self.post(endpoint, "/api/fs/list", path).await?;
        Ok(data.and_then(|d| d.content).unwrap_or_default())
    }

    async fn raw_url(&self, endpoint: &AlistEndpoint, path: &str) -> Result<Option<String>, StorageError> {
        let data: Option<FsGetData> = self.post(endpoint, "/api/fs/get", path).await?;
        Ok(data.map(|d| d.raw_url).filter(|u| !u.is_empty()))
    }
}
