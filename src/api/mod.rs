use actix_web::{error::InternalError, http::StatusCode, web, HttpResponse, ResponseError};
use log::warn;
use serde::Serialize;

use crate::catalog::CatalogError;
use crate::storage::StorageError;

mod images;
mod storage;

/// 统一响应结构：{code, message, data}
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> HttpResponse {
        HttpResponse::Ok().json(ApiResponse {
            code: 200,
            message: message.into(),
            data: Some(data),
        })
    }
}

pub fn failure(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::<()> {
        code: status.as_u16(),
        message: message.into(),
        data: None,
    })
}

impl ResponseError for StorageError {
    fn status_code(&self) -> StatusCode {
        match self {
            StorageError::Configuration(_)
            | StorageError::Validation(_)
            | StorageError::UnsupportedProvider(_) => StatusCode::BAD_REQUEST,
            StorageError::RemoteProvider(_) | StorageError::ConfigStore(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        failure(self.status_code(), self.to_string())
    }
}

impl ResponseError for CatalogError {
    fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // 数据库细节只写日志
            CatalogError::Database(_) => "服务器错误".to_string(),
            other => other.to_string(),
        };
        failure(self.status_code(), message)
    }
}

/// 注册所有路由
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        warn!("请求体解析失败: {}", err);
        let response = failure(StatusCode::BAD_REQUEST, format!("请求格式错误: {}", err));
        InternalError::from_response(err, response).into()
    });

    cfg.app_data(json_config)
        .service(
            web::scope("/api/v1/storage")
                .route("/browse-directory", web::post().to(storage::browse_directory))
                .route("/test-connection", web::post().to(storage::test_connection))
                .route("/status", web::get().to(storage::storage_status)),
        )
        .service(
            web::scope("/api/v1/images")
                .route("/import", web::post().to(images::import_images))
                .route("/batch-delete", web::delete().to(images::batch_delete))
                .route("/batch-update-mainpage", web::put().to(images::batch_update_mainpage))
                .route("/update-show", web::put().to(images::update_show))
                .route("/update-album", web::put().to(images::update_album)),
        );
}
