use super::DirectoryLister;
use crate::storage::alist_client::{AlistApi, AlistEndpoint, AlistEntry, ALIST_TYPE_IMAGE, ALIST_TYPE_UNKNOWN};
use crate::storage::model::{is_image_file, DirectoryListing, FileDescriptor, StorageConfig, StorageError};
use crate::storage::path_normalizer::PathNormalizer;
use crate::storage::url::{ensure_scheme, has_scheme};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use log::{debug, warn};
use std::sync::Arc;

pub struct AlistLister {
    api: Arc<dyn AlistApi>,
    endpoint: AlistEndpoint,
    concurrency: usize,
}

impl AlistLister {
    /// 令牌或地址缺失时直接返回配置错误，不发起任何请求
    pub fn new(api: Arc<dyn AlistApi>, config: &StorageConfig, concurrency: usize) -> Result<Self, StorageError> {
        let (base_url, token) = match (config.get("alist_url"), config.get("alist_token")) {
            (Some(url), Some(token)) => (ensure_scheme(url), token.to_string()),
            _ => {
                return Err(StorageError::Configuration(
                    "AList 配置信息不完整".to_string(),
                ))
            }
        };

        Ok(Self {
            api,
            endpoint: AlistEndpoint { base_url, token },
            concurrency: concurrency.max(1),
        })
    }

    /// 缩略图优先，其次 /api/fs/get 的 raw_url，最后回退到 /d 直链
    async fn resolve_url(&self, key: &str, thumb: &str) -> String {
        if !thumb.is_empty() {
            return absolutize(&self.endpoint.base_url, thumb);
        }

        match self.api.raw_url(&self.endpoint, key).await {
            Ok(Some(raw)) => absolutize(&self.endpoint.base_url, &raw),
            Ok(None) => {
                debug!("AList 未返回 raw_url，使用直链: {}", key);
                direct_link(&self.endpoint.base_url, key)
            }
            Err(e) => {
                warn!("获取文件 URL 失败: {} - {}", key, e);
                direct_link(&self.endpoint.base_url, key)
            }
        }
    }
}

#[async_trait]
impl DirectoryLister for AlistLister {
    async fn list(&self, path: &str, prefix: &str) -> Result<DirectoryListing, StorageError> {
        if prefix.trim().is_empty() {
            return Err(StorageError::Configuration("AList 挂载路径不能为空".to_string()));
        }

        let mount = PathNormalizer::normalize(prefix);
        let full_path = PathNormalizer::join(&mount, path);
        debug!("AList 列表 - 挂载路径: {}, 完整路径: {}", mount, full_path);

        let entries = self.api.list_dir(&self.endpoint, &full_path).await?;

        let mut directories = Vec::new();
        let mut pending: Vec<(AlistEntry, String)> = Vec::new();
        for entry in entries {
            let key = PathNormalizer::join(&full_path, &entry.name);
            if key == full_path {
                continue;
            }
            if entry.is_dir {
                directories.push(PathNormalizer::browse_path(&mount, &key));
            } else if is_image_entry(&entry) {
                pending.push((entry, key));
            }
        }

        // 并发解析缺少缩略图的文件地址，保持原有顺序
        let files = stream::iter(pending)
            .map(|(entry, key)| async move {
                let url = self.resolve_url(&key, &entry.thumb).await;
                FileDescriptor {
                    last_modified: entry.modified.as_deref().and_then(parse_modified),
                    name: entry.name,
                    key,
                    url,
                    size: entry.size,
                }
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(DirectoryListing { directories, files })
    }
}

fn is_image_entry(entry: &AlistEntry) -> bool {
    (entry.kind == ALIST_TYPE_IMAGE || entry.kind == ALIST_TYPE_UNKNOWN) && is_image_file(&entry.name)
}

fn parse_modified(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn absolutize(base_url: &str, url: &str) -> String {
    if has_scheme(url) {
        url.to_string()
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{}", rest)
    } else if url.starts_with('/') {
        format!("{}{}", base_url, url)
    } else {
        ensure_scheme(url)
    }
}

fn direct_link(base_url: &str, key: &str) -> String {
    match reqwest::Url::parse(base_url) {
        Ok(mut url) => {
            let pushed = url
                .path_segments_mut()
                .map(|mut segments| {
                    segments.pop_if_empty().push("d");
                    segments.extend(key.split('/').filter(|s| !s.is_empty()));
                })
                .is_ok();
            if pushed {
                url.to_string()
            } else {
                format!("{}/d{}", base_url, key)
            }
        }
        Err(_) => format!("{}/d{}", base_url, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::alist_client::MockAlistApi;
    use crate::storage::model::{ConfigEntry, Provider};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    fn config(pairs: &[(&str, &str)]) -> StorageConfig {
        StorageConfig::new(
            Provider::Alist,
            pairs.iter().map(|(k, v)| ConfigEntry::new(k, v)).collect(),
        )
    }

    fn configured() -> StorageConfig {
        config(&[("alist_url", "https://alist.example.com/"), ("alist_token", "tok")])
    }

    fn entry(name: &str, is_dir: bool, thumb: &str, kind: i64) -> AlistEntry {
        AlistEntry {
            name: name.to_string(),
            size: 9,
            is_dir,
            modified: Some("2024-05-01T10:00:00+08:00".to_string()),
            thumb: thumb.to_string(),
            kind,
        }
    }

    #[test]
    fn missing_token_is_configuration_error_without_requests() {
        // 没有设置任何期望，任何调用都会让 mock panic
        let api = MockAlistApi::new();
        let result = AlistLister::new(
            Arc::new(api),
            &config(&[("alist_url", "https://alist.example.com")]),
            4,
        );
        assert!(matches!(result, Err(StorageError::Configuration(_))));
    }

    #[tokio::test]
    async fn missing_mount_path_is_configuration_error() {
        let api = MockAlistApi::new();
        let lister = AlistLister::new(Arc::new(api), &configured(), 4).unwrap();
        let result = lister.list("photos", "  ").await;
        assert!(matches!(result, Err(StorageError::Configuration(_))));
    }

    #[tokio::test]
    async fn partitions_entries_and_resolves_missing_urls() {
        let mut api = MockAlistApi::new();
        api.expect_list_dir()
            .withf(|endpoint, path| endpoint.token == "tok" && path == "/mnt/trip")
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    entry("day1", true, "", 1),
                    entry("a.jpg", false, "https://thumbs.example.com/a.jpg", ALIST_TYPE_IMAGE),
                    entry("b.png", false, "", ALIST_TYPE_IMAGE),
                    entry("c.txt", false, "", 4),
                    entry("d.heic", false, "", ALIST_TYPE_IMAGE),
                ])
            });
        api.expect_raw_url()
            .withf(|_, path| path == "/mnt/trip/b.png")
            .times(1)
            .returning(|_, _| Ok(Some("https://cdn.example.com/raw/b.png".to_string())));

        let lister = AlistLister::new(Arc::new(api), &configured(), 4).unwrap();
        let listing = lister.list("trip/", "/mnt/").await.unwrap();

        assert_eq!(listing.directories, vec!["trip/day1/".to_string()]);
        let names: Vec<_> = listing.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
        assert_eq!(listing.files[0].url, "https://thumbs.example.com/a.jpg");
        assert_eq!(listing.files[1].url, "https://cdn.example.com/raw/b.png");
        assert_eq!(listing.files[1].key, "/mnt/trip/b.png");
        assert!(listing.files[1].last_modified.is_some());
    }

    #[tokio::test]
    async fn failed_resolution_falls_back_to_direct_link() {
        let mut api = MockAlistApi::new();
        api.expect_list_dir()
            .returning(|_, _| Ok(vec![entry("my photo.jpg", false, "", ALIST_TYPE_UNKNOWN)]));
        api.expect_raw_url()
            .returning(|_, _| Err(StorageError::RemoteProvider("object not found".to_string())));

        let lister = AlistLister::new(Arc::new(api), &configured(), 2).unwrap();
        let listing = lister.list("", "/").await.unwrap();

        assert_eq!(listing.files.len(), 1);
        assert_eq!(
            listing.files[0].url,
            "https://alist.example.com/d/my%20photo.jpg"
        );
    }

    #[tokio::test]
    async fn remote_list_failure_aborts() {
        let mut api = MockAlistApi::new();
        api.expect_list_dir()
            .returning(|_, _| Err(StorageError::RemoteProvider("token is invalidated".to_string())));

        let lister = AlistLister::new(Arc::new(api), &configured(), 2).unwrap();
        let result = lister.list("", "/mnt").await;
        assert!(matches!(result, Err(StorageError::RemoteProvider(_))));
    }

    #[tokio::test]
    async fn self_entry_is_not_listed() {
        let mut api = MockAlistApi::new();
        api.expect_list_dir().returning(|_, _| {
            Ok(vec![
                entry("", true, "", 1),
                entry(".", true, "", 1),
                entry("2024", true, "", 1),
                entry("a.jpg", false, "https://thumbs.example.com/a.jpg", ALIST_TYPE_IMAGE),
            ])
        });

        let lister = AlistLister::new(Arc::new(api), &configured(), 2).unwrap();
        let listing = lister.list("trip", "/mnt").await.unwrap();

        assert_eq!(listing.directories, vec!["trip/2024/".to_string()]);
        assert_eq!(listing.files.len(), 1);
    }

    /// raw_url 每次耗时固定，并记录同时进行中的请求数
    struct SlowAlist {
        files: usize,
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl AlistApi for SlowAlist {
        async fn list_dir(&self, _: &AlistEndpoint, _: &str) -> Result<Vec<AlistEntry>, StorageError> {
            Ok((0..self.files)
                .map(|i| entry(&format!("{}.jpg", i), false, "", ALIST_TYPE_IMAGE))
                .collect())
        }

        async fn raw_url(&self, endpoint: &AlistEndpoint, path: &str) -> Result<Option<String>, StorageError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(format!("{}/raw{}", endpoint.base_url, path)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn url_lookups_run_concurrently_within_limit() {
        let api = Arc::new(SlowAlist {
            files: 7,
            delay: Duration::from_millis(100),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let lister = AlistLister::new(api.clone(), &configured(), 3).unwrap();

        let started = Instant::now();
        let listing = lister.list("", "/pics").await.unwrap();
        let elapsed = started.elapsed();

        // 7 个文件、并发 3：三轮
        assert!(elapsed >= Duration::from_millis(300), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(400), "elapsed {:?}", elapsed);
        assert_eq!(api.peak.load(Ordering::SeqCst), 3);

        let names: Vec<_> = listing.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["0.jpg", "1.jpg", "2.jpg", "3.jpg", "4.jpg", "5.jpg", "6.jpg"]);
        assert_eq!(listing.files[4].url, "https://alist.example.com/raw/pics/4.jpg");
    }

    #[test]
    fn relative_urls_become_absolute() {
        assert_eq!(
            absolutize("https://alist.example.com", "/p/a.jpg?sign=x"),
            "https://alist.example.com/p/a.jpg?sign=x"
        );
        assert_eq!(absolutize("https://a", "//cdn.example.com/x.jpg"), "https://cdn.example.com/x.jpg");
    }
}
