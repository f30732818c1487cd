use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use validator::Validate;

pub type ImageId = String;

// 显示状态：0 显示，1 隐藏
pub const SHOW_VISIBLE: i16 = 0;
pub const SHOW_HIDDEN: i16 = 1;

// 首页显示：0 显示，1 不显示
pub const MAINPAGE_SHOWN: i16 = 0;
pub const MAINPAGE_HIDDEN: i16 = 1;

pub const IMAGE_TYPE_PHOTO: i16 = 1;

// 未知尺寸时的占位
pub const DEFAULT_WIDTH: i32 = 800;
pub const DEFAULT_HEIGHT: i32 = 600;

/// 待写入的图片行
#[derive(Debug, Clone, PartialEq)]
pub struct NewImage {
    pub url: String,
    pub title: String,
    pub width: i32,
    pub height: i32,
    pub dimensions_estimated: bool,
    pub image_type: i16,
    pub show: i16,
    pub show_on_mainpage: i16,
    pub sort: i16,
}

/// 导入请求中的单个文件描述；除 url 外的字段类型不符时按缺省处理
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFile {
    pub url: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub size: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub width: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub height: Option<i32>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// 单个导入项；无法识别的条目保留原样，在导入时记为失败
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportCandidate {
    File(ImportFile),
    Malformed(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ImportRequest {
    #[validate(length(min = 1, message = "图片不能为空"))]
    #[serde(default)]
    pub images: Vec<ImportCandidate>,
    #[validate(length(min = 1, message = "相册不能为空"))]
    #[serde(default)]
    pub album: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("参数错误: {0}")]
    Validation(String),

    #[error("记录不存在: {0}")]
    NotFound(String),

    #[error("数据库错误: {0}")]
    Database(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::Database(e.to_string())
    }
}
