use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("缺少环境变量: {0}")]
    Missing(&'static str),

    #[error("环境变量 {key} 的值无效: {value}")]
    Invalid { key: &'static str, value: String },
}

/// 进程级配置，启动时从环境变量读取
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub log_dir: PathBuf,
    pub log_level: LevelFilter,
    pub db_max_connections: u32,
    pub remote_timeout: Duration,
    pub alist_concurrency: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "SERVER_PORT", 8080)?,
            log_dir: PathBuf::from(get("LOG_DIR").unwrap_or_else(|| "logs".to_string())),
            log_level: parse_or(&get, "LOG_LEVEL", LevelFilter::Debug)?,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 5)?,
            remote_timeout: Duration::from_secs(parse_or(&get, "REMOTE_TIMEOUT_SECS", 15)?),
            alist_concurrency: positive(parse_or(&get, "ALIST_RESOLVE_CONCURRENCY", 8)?, "ALIST_RESOLVE_CONCURRENCY")?,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn positive(value: usize, key: &'static str) -> Result<usize, ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/gallery")])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.remote_timeout, Duration::from_secs(15));
        assert_eq!(config.alist_concurrency, 8);
    }

    #[test]
    fn database_url_is_required() {
        let result = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")]));
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/gallery"),
            ("SERVER_PORT", "9000"),
            ("LOG_LEVEL", "warn"),
            ("REMOTE_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level, LevelFilter::Warn);
        assert_eq!(config.remote_timeout, Duration::from_secs(3));
    }

    #[test]
    fn bad_values_are_rejected() {
        let result = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/gallery"),
            ("SERVER_PORT", "eighty"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { key: "SERVER_PORT", .. })));

        let result = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/gallery"),
            ("ALIST_RESOLVE_CONCURRENCY", "0"),
        ]));
        assert!(result.is_err());
    }
}
