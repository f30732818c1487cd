use crate::storage::manager::StorageManager;
use crate::storage::model::{DirectoryListing, Provider, StorageError};
use log::{info, warn};
use serde::Serialize;

/// 连接测试结果，仅用于界面开关，不影响图库数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub ok: bool,
    pub message: String,
}

impl ProbeReport {
    pub fn from_result(provider: &str, result: &Result<DirectoryListing, StorageError>) -> Self {
        match result {
            Ok(listing) => ProbeReport {
                ok: true,
                message: format!(
                    "{} 连接成功，顶层共 {} 个目录、{} 个图片",
                    provider,
                    listing.directories.len(),
                    listing.files.len()
                ),
            },
            Err(e) => ProbeReport {
                ok: false,
                message: e.to_string(),
            },
        }
    }
}

impl StorageManager {
    /// 测试连接：执行一次单层列表，没有异常即视为成功，同时返回列表结果
    pub async fn test_connection(
        &self,
        storage: &str,
        path: &str,
        prefix: &str,
    ) -> Result<(ProbeReport, DirectoryListing), StorageError> {
        let provider: Provider = storage.parse()?;
        info!("测试连接 - 存储: {}", provider);

        let result = match self.lister(provider).await {
            Ok(lister) => lister.list(path, prefix).await,
            Err(e) => Err(e),
        };

        let report = ProbeReport::from_result(provider.as_str(), &result);
        if report.ok {
            info!("{}", report.message);
        } else {
            warn!("{} 连接测试失败: {}", provider, report.message);
        }
        result.map(|listing| (report, listing))
    }
}
