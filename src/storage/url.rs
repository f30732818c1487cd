use crate::storage::model::{Provider, StorageConfig, StorageError};

/// 为对象键生成可公开访问的绝对地址
#[derive(Debug, Clone, PartialEq)]
pub enum UrlResolver {
    /// S3 开启 CDN：`{cdn}/{key}`
    S3Cdn { cdn_url: String },
    /// S3 虚拟主机风格：`https://{bucket}.{endpoint}/{key}`
    S3Bucket { bucket: String, endpoint: String },
    /// R2 / COS：`{base}/{key}`
    Base { base_url: String },
}

impl UrlResolver {
    pub fn for_config(config: &StorageConfig) -> Result<Self, StorageError> {
        match config.provider() {
            Provider::S3 => {
                if config.flag("s3_cdn") {
                    let cdn = config.require("s3_cdn_url")?;
                    Ok(UrlResolver::S3Cdn {
                        cdn_url: normalize_base(cdn),
                    })
                } else {
                    let endpoint = strip_scheme(config.require("endpoint")?);
                    Ok(UrlResolver::S3Bucket {
                        bucket: config.require("bucket")?.to_string(),
                        endpoint: endpoint.trim_end_matches('/').to_string(),
                    })
                }
            }
            Provider::R2 => {
                let domain = match config.get("r2_public_domain") {
                    Some(domain) => domain,
                    None => config.require("r2_endpoint")?,
                };
                Ok(UrlResolver::Base {
                    base_url: normalize_base(domain),
                })
            }
            Provider::Cos => {
                let base_url = match config.get("cos_domain") {
                    Some(domain) => normalize_base(domain),
                    None => format!(
                        "https://{}.cos.{}.myqcloud.com",
                        config.require("cos_bucket")?,
                        config.require("cos_region")?
                    ),
                };
                Ok(UrlResolver::Base { base_url })
            }
            Provider::Alist => Err(StorageError::Configuration(
                "AList 的文件地址由服务端返回，不使用对象存储地址规则".to_string(),
            )),
        }
    }

    pub fn resolve(&self, key: &str) -> String {
        let key = key.trim_start_matches('/');
        match self {
            UrlResolver::S3Cdn { cdn_url } => format!("{}/{}", cdn_url, key),
            UrlResolver::S3Bucket { bucket, endpoint } => {
                format!("https://{}.{}/{}", bucket, endpoint, key)
            }
            UrlResolver::Base { base_url } => format!("{}/{}", base_url, key),
        }
    }
}

/// 对外访问地址统一为 https，并去掉末尾斜杠
pub fn normalize_base(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    format!("https://{}", strip_scheme(domain).trim_start_matches('/'))
}

/// 服务端地址（API endpoint、AList）：缺少协议时补 https，已有 http(s) 保持不变
pub fn ensure_scheme(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if has_scheme(url) {
        url.to_string()
    } else {
        format!("https://{}", url.trim_start_matches('/'))
    }
}

pub fn has_scheme(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

fn strip_scheme(endpoint: &str) -> &str {
    let lower = endpoint.to_ascii_lowercase();
    if lower.starts_with("https://") {
        &endpoint["https://".len()..]
    } else if lower.starts_with("http://") {
        &endpoint["http://".len()..]
    } else {
        endpoint
    }
}
