use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// 追加写入单个日志文件
pub struct Logger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl Logger {
    pub fn new(log_path: &Path, level: LevelFilter) -> Result<Self, std::io::Error> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Logger {
            file: Mutex::new(file),
            level,
        })
    }

    pub fn init(log_path: &Path, level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
        let logger = Self::new(log_path, level)?;
        log::set_boxed_logger(Box::new(logger))?;
        log::set_max_level(level);
        Ok(())
    }

    fn format(record: &Record) -> String {
        format!(
            "[{}] [{}] [{}:{}] {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.file().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.args()
        )
    }
}

/// 文件日志不可用时退回到 stderr
pub fn init_fallback(level: LevelFilter) {
    let _ = env_logger::Builder::new().filter_level(level).try_init();
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_entry = Self::format(record);
            if let Ok(mut file) = self.file.lock() {
                let _ = file.write_all(log_entry.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn level_filters_records() {
        let path = std::env::temp_dir().join(format!("gallery-logger-{}.log", uuid::Uuid::new_v4()));
        let logger = Logger::new(&path, LevelFilter::Info).unwrap();

        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("被过滤"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .file(Some("src/storage/manager.rs"))
                .line(Some(42))
                .args(format_args!("存储配置不完整"))
                .build(),
        );
        logger.flush();

        let content = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(!content.contains("被过滤"));
        assert!(content.contains("[WARN] [src/storage/manager.rs:42] 存储配置不完整"));
    }
}
