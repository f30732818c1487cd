use actix_web::{web, HttpResponse};
use log::{error, info};
use serde::Deserialize;

use super::ApiResponse;
use crate::storage::StorageError;

#[derive(Debug, Deserialize)]
pub struct BrowseRequest {
    pub storage: Option<String>,
    pub path: Option<String>,
    pub prefix: Option<String>,
}

impl BrowseRequest {
    fn parts(&self) -> (&str, &str, &str) {
        (
            self.storage.as_deref().unwrap_or(""),
            self.path.as_deref().unwrap_or(""),
            self.prefix.as_deref().unwrap_or(""),
        )
    }
}

// 浏览目录
pub async fn browse_directory(
    body: web::Json<BrowseRequest>,
    data: web::Data<crate::AppState>,
) -> Result<HttpResponse, StorageError> {
    let (storage, path, prefix) = body.parts();

    match data.storage.browse(storage, path, prefix).await {
        Ok(listing) => Ok(ApiResponse::success("Success", listing)),
        Err(e) => {
            error!("浏览目录失败 - 存储: {}, 路径: {}: {}", storage, path, e);
            Err(e)
        }
    }
}

// 测试连接并列出顶层目录
pub async fn test_connection(
    body: web::Json<BrowseRequest>,
    data: web::Data<crate::AppState>,
) -> Result<HttpResponse, StorageError> {
    let (storage, path, prefix) = body.parts();

    let (report, listing) = data.storage.test_connection(storage, path, prefix).await?;
    Ok(ApiResponse::success(report.message, listing))
}

// 各存储的配置状态
pub async fn storage_status(data: web::Data<crate::AppState>) -> Result<HttpResponse, StorageError> {
    let status = data.storage.status().await?;
    info!("存储配置状态: {:?}", status);
    Ok(ApiResponse::success("Success", status))
}
