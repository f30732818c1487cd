use crate::catalog::model::{
    CatalogError, ImportCandidate, ImportFile, ImportRequest, NewImage, DEFAULT_HEIGHT, DEFAULT_WIDTH,
    IMAGE_TYPE_PHOTO, MAINPAGE_HIDDEN, SHOW_VISIBLE,
};
use crate::catalog::store::CatalogStore;
use log::{debug, error, info, warn};
use std::sync::Arc;
use validator::Validate;

/// 导入结果：成功数与请求总数，成功数小于总数即为部分失败
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub requested: usize,
}

impl ImportSummary {
    pub fn is_partial(&self) -> bool {
        self.imported < self.requested
    }
}

/// 批量导入：按 URL 引用远程文件，不复制文件内容
#[derive(Clone)]
pub struct ImportCoordinator {
    catalog: Arc<dyn CatalogStore>,
}

impl ImportCoordinator {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    /// 校验失败时不做任何写入；单个文件失败只记录日志并跳过
    pub async fn batch_import(&self, request: ImportRequest) -> Result<ImportSummary, CatalogError> {
        let album = request.album.trim().to_string();
        let request = ImportRequest { album, ..request };
        request.validate().map_err(|e| {
            warn!("导入参数校验失败: {}", e);
            CatalogError::Validation(validation_message(&e))
        })?;

        let requested = request.images.len();
        info!("开始导入 {} 张图片到相册 {}", requested, request.album);

        let mut imported = 0;
        for (index, candidate) in request.images.iter().enumerate() {
            match self.import_one(candidate, &request.album).await {
                Ok(id) => {
                    imported += 1;
                    debug!("第 {} 张图片导入成功: {}", index + 1, id);
                }
                Err(e) => {
                    error!("导入图片失败（第 {} 张）: {}", index + 1, e);
                }
            }
        }

        let summary = ImportSummary { imported, requested };
        if summary.is_partial() {
            warn!("部分导入失败: {}/{} 导入成功", imported, requested);
        } else {
            info!("导入完成: {}/{}", imported, requested);
        }
        Ok(summary)
    }

    async fn import_one(&self, candidate: &ImportCandidate, album: &str) -> Result<String, CatalogError> {
        let file = match candidate {
            ImportCandidate::File(file) => file,
            ImportCandidate::Malformed(raw) => {
                return Err(CatalogError::Validation(format!("无法识别的文件描述: {}", raw)))
            }
        };
        let image = new_image(file)?;
        self.catalog.create_image_in_album(&image, album).await
    }
}

/// 由文件描述生成图片行，未知尺寸使用占位并打上标记
pub fn new_image(file: &ImportFile) -> Result<NewImage, CatalogError> {
    let url = file.url.trim();
    if url.is_empty() {
        return Err(CatalogError::Validation("图片链接不能为空".to_string()));
    }

    let (width, height, dimensions_estimated) = match (file.width, file.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h, false),
        _ => (DEFAULT_WIDTH, DEFAULT_HEIGHT, true),
    };

    Ok(NewImage {
        url: url.to_string(),
        title: title_for(file),
        width,
        height,
        dimensions_estimated,
        image_type: IMAGE_TYPE_PHOTO,
        show: SHOW_VISIBLE,
        show_on_mainpage: MAINPAGE_HIDDEN,
        sort: 0,
    })
}

/// 标题取文件名并去掉最后一个扩展名
fn title_for(file: &ImportFile) -> String {
    let source = [Some(file.name.as_str()), file.key.as_deref(), Some(file.url.as_str())]
        .into_iter()
        .flatten()
        .map(|s| s.split(['?', '#']).next().unwrap_or(s))
        .map(|s| s.trim_end_matches('/').rsplit('/').next().unwrap_or(s))
        .find(|s| !s.is_empty())
        .unwrap_or_default();

    match source.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => source.to_string(),
    }
}

fn validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| errors.to_string())
}
