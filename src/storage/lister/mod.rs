use crate::storage::model::{file_name, is_image_file, DirectoryListing, FileDescriptor, StorageError};
use crate::storage::object_store::{LevelListing, ObjectStoreClient};
use crate::storage::path_normalizer::PathNormalizer;
use crate::storage::url::UrlResolver;
use async_trait::async_trait;
use log::debug;

mod alist;
mod cos;
mod r2;
mod s3;

pub use alist::AlistLister;
pub use cos::CosLister;
pub use r2::R2Lister;
pub use s3::S3Lister;

#[async_trait]
pub trait DirectoryLister: Send + Sync {
    /// 列出 path 下一层的目录与图片文件；prefix 仅对 AList 有意义（挂载路径）
    async fn list(&self, path: &str, prefix: &str) -> Result<DirectoryListing, StorageError>;
}

/// 对象存储的一层浏览请求
pub(crate) struct ObjectLevel<'a> {
    pub bucket: &'a str,
    pub folder: &'a str,
    pub path: &'a str,
}

/// S3 / R2 / COS 共用的单层列表算法
pub(crate) async fn list_object_level(
    client: &dyn ObjectStoreClient,
    level: ObjectLevel<'_>,
    urls: &UrlResolver,
) -> Result<DirectoryListing, StorageError> {
    let root = PathNormalizer::object_prefix(level.folder, "");
    let full_prefix = PathNormalizer::object_prefix(level.folder, level.path);
    debug!("对象存储列表 - 存储桶: {}, 前缀: {}", level.bucket, full_prefix);

    let raw = client.list_level(level.bucket, &full_prefix).await?;
    Ok(partition_level(raw, &root, &full_prefix, urls))
}

/// 去掉“自身”条目，过滤非图片，目录转为浏览路径
fn partition_level(
    raw: LevelListing,
    root: &str,
    full_prefix: &str,
    urls: &UrlResolver,
) -> DirectoryListing {
    let directories = raw
        .common_prefixes
        .into_iter()
        .filter(|p| !p.is_empty() && p != full_prefix)
        .map(|p| PathNormalizer::browse_path(root, &p))
        .collect();

    let files = raw
        .objects
        .into_iter()
        .filter(|obj| obj.key != full_prefix && !obj.key.ends_with('/') && is_image_file(&obj.key))
        .map(|obj| FileDescriptor {
            name: file_name(&obj.key).to_string(),
            url: urls.resolve(&obj.key),
            key: obj.key,
            size: obj.size,
            last_modified: obj.last_modified,
        })
        .collect();

    DirectoryListing { directories, files }
}
