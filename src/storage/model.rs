use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 允许导入的图片扩展名（小写，不带点）
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "svg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    S3,
    R2,
    Cos,
    Alist,
}

impl Provider {
    pub const ALL: [Provider; 4] = [Provider::S3, Provider::R2, Provider::Cos, Provider::Alist];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::S3 => "s3",
            Provider::R2 => "r2",
            Provider::Cos => "cos",
            Provider::Alist => "alist",
        }
    }

    /// 判定“已配置”所需的非空键
    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            Provider::S3 => &["accesskey_id", "accesskey_secret", "endpoint", "bucket"],
            Provider::R2 => &["r2_accesskey_id", "r2_accesskey_secret", "r2_endpoint", "r2_bucket"],
            Provider::Cos => &["cos_secret_id", "cos_secret_key", "cos_region", "cos_bucket"],
            Provider::Alist => &["alist_url", "alist_token"],
        }
    }

    /// 每次请求从配置表读取的全部键
    pub fn config_keys(&self) -> &'static [&'static str] {
        match self {
            Provider::S3 => &[
                "accesskey_id",
                "accesskey_secret",
                "region",
                "endpoint",
                "bucket",
                "storage_folder",
                "force_path_style",
                "s3_cdn",
                "s3_cdn_url",
            ],
            Provider::R2 => &[
                "r2_accesskey_id",
                "r2_accesskey_secret",
                "r2_endpoint",
                "r2_bucket",
                "r2_storage_folder",
                "r2_public_domain",
            ],
            Provider::Cos => &[
                "cos_secret_id",
                "cos_secret_key",
                "cos_region",
                "cos_bucket",
                "cos_storage_folder",
                "cos_domain",
            ],
            Provider::Alist => &["alist_url", "alist_token"],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(Provider::S3),
            "r2" => Ok(Provider::R2),
            "cos" => Ok(Provider::Cos),
            "alist" => Ok(Provider::Alist),
            "" => Err(StorageError::Validation("存储类型不能为空".to_string())),
            other => Err(StorageError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// 配置表中的一行
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ConfigEntry {
    pub config_key: String,
    pub config_value: Option<String>,
}

impl ConfigEntry {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            config_key: key.to_string(),
            config_value: Some(value.to_string()),
        }
    }
}

/// 某个存储提供方的配置快照，每次请求重新读取
#[derive(Debug, Clone)]
pub struct StorageConfig {
    provider: Provider,
    entries: Vec<ConfigEntry>,
}

impl StorageConfig {
    pub fn new(provider: Provider, entries: Vec<ConfigEntry>) -> Self {
        Self { provider, entries }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// 取值，空白视为缺失
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.config_key == key)
            .and_then(|e| e.config_value.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn require(&self, key: &str) -> Result<&str, StorageError> {
        self.get(key).ok_or_else(|| {
            StorageError::Configuration(format!("{} 缺少配置项: {}", self.provider, key))
        })
    }

    pub fn missing_keys(&self) -> Vec<&'static str> {
        self.provider
            .required_keys()
            .iter()
            .copied()
            .filter(|k| self.get(k).is_none())
            .collect()
    }

    pub fn is_configured(&self) -> bool {
        self.missing_keys().is_empty()
    }

    /// 校验必填项，缺失时返回 ConfigurationError
    pub fn ensure_configured(&self) -> Result<(), StorageError> {
        let missing = self.missing_keys();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(StorageError::Configuration(format!(
                "{} 配置信息不完整，缺少: {}",
                self.provider,
                missing.join(", ")
            )))
        }
    }
}

/// 列表返回的单个文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name: String,
    pub key: String,
    pub url: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub directories: Vec<String>,
    pub files: Vec<FileDescriptor>,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("参数错误: {0}")]
    Validation(String),

    #[error("不支持的存储类型: {0}")]
    UnsupportedProvider(String),

    #[error("远程存储错误: {0}")]
    RemoteProvider(String),

    #[error("读取配置失败: {0}")]
    ConfigStore(String),
}

/// 按扩展名判断是否为允许的图片，大小写不敏感
pub fn is_image_file(name: &str) -> bool {
    match file_name(name).rsplit_once('.') {
        Some((_, ext)) => IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// 取路径最后一段作为文件名
pub fn file_name(key: &str) -> &str {
    key.trim_end_matches('/').rsplit('/').next().unwrap_or(key)
}
