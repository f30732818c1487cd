use actix_web::{web, HttpResponse};
use log::{error, info};
use serde::Deserialize;

use super::ApiResponse;
use crate::catalog::{CatalogError, ImportRequest, MAINPAGE_HIDDEN, MAINPAGE_SHOWN, SHOW_HIDDEN, SHOW_VISIBLE};

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainpageRequest {
    #[serde(default)]
    pub image_ids: Vec<String>,
    pub show_on_mainpage: i16,
}

#[derive(Debug, Deserialize)]
pub struct ShowRequest {
    pub id: String,
    pub show: i16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRequest {
    pub image_id: String,
    pub album: String,
}

// 从远程存储批量导入
pub async fn import_images(
    body: web::Json<ImportRequest>,
    data: web::Data<crate::AppState>,
) -> Result<HttpResponse, CatalogError> {
    let importer = data.importer.clone();
    let request = body.into_inner();

    // 独立任务执行，客户端断开也会跑完
    let summary = tokio::spawn(async move { importer.batch_import(request).await })
        .await
        .map_err(|e| {
            error!("导入任务异常退出: {}", e);
            CatalogError::Database(e.to_string())
        })??;

    Ok(ApiResponse::success(
        format!("{}/{} 导入成功", summary.imported, summary.requested),
        summary.imported,
    ))
}

// 批量逻辑删除
pub async fn batch_delete(
    body: web::Json<DeleteRequest>,
    data: web::Data<crate::AppState>,
) -> Result<HttpResponse, CatalogError> {
    let ids = body.into_inner().ids;
    if ids.is_empty() {
        return Err(CatalogError::Validation("图片不能为空".to_string()));
    }

    let deleted = data.catalog.soft_delete_images(&ids).await?;
    info!("批量删除图片: {} / {}", deleted, ids.len());
    Ok(ApiResponse::success("删除成功", deleted))
}

// 批量设置首页显示
pub async fn batch_update_mainpage(
    body: web::Json<MainpageRequest>,
    data: web::Data<crate::AppState>,
) -> Result<HttpResponse, CatalogError> {
    if body.image_ids.is_empty() {
        return Err(CatalogError::Validation("图片不能为空".to_string()));
    }
    if ![MAINPAGE_SHOWN, MAINPAGE_HIDDEN].contains(&body.show_on_mainpage) {
        return Err(CatalogError::Validation(format!(
            "无效的首页显示状态: {}",
            body.show_on_mainpage
        )));
    }

    let updated = data
        .catalog
        .update_mainpage(&body.image_ids, body.show_on_mainpage)
        .await?;
    Ok(ApiResponse::success("更新成功", updated))
}

pub async fn update_show(
    body: web::Json<ShowRequest>,
    data: web::Data<crate::AppState>,
) -> Result<HttpResponse, CatalogError> {
    if ![SHOW_VISIBLE, SHOW_HIDDEN].contains(&body.show) {
        return Err(CatalogError::Validation(format!("无效的显示状态: {}", body.show)));
    }

    data.catalog.update_show(&body.id, body.show).await?;
    Ok(ApiResponse::success("更新成功", body.id.clone()))
}

// 更换相册
pub async fn update_album(
    body: web::Json<AlbumRequest>,
    data: web::Data<crate::AppState>,
) -> Result<HttpResponse, CatalogError> {
    let album = body.album.trim();
    if album.is_empty() {
        return Err(CatalogError::Validation("相册不能为空".to_string()));
    }

    data.catalog.rebind_album(&body.image_id, album).await?;
    info!("图片 {} 移动到相册 {}", body.image_id, album);
    Ok(ApiResponse::success("更新成功", body.image_id.clone()))
}
