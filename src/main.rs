mod api;
mod catalog;
mod config;
mod db;
mod logger;
mod storage;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use sqlx::postgres::PgPoolOptions;
use std::fs;
use std::io;
use std::sync::Arc;

use catalog::{CatalogStore, ImportCoordinator, PgCatalogStore};
use config::AppConfig;
use db::PgConfigStore;
use storage::{ProviderRegistry, StorageManager};

// 应用状态
struct AppState {
    storage: StorageManager,
    importer: ImportCoordinator,
    catalog: Arc<dyn CatalogStore>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 加载 .env
    dotenv().ok();

    let config = AppConfig::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("配置错误: {}", e)))?;

    // 创建日志目录并初始化日志系统
    if !config.log_dir.exists() {
        fs::create_dir_all(&config.log_dir)?;
    }
    let log_path = config.log_dir.join("app.log");
    if let Err(e) = logger::Logger::init(&log_path, config.log_level) {
        eprintln!("初始化日志系统失败: {}", e);
        logger::init_fallback(config.log_level);
    }

    info!("应用程序启动");

    // 连接数据库
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("数据库连接错误: {}", e);
            io::Error::new(io::ErrorKind::Other, format!("数据库连接错误: {}", e))
        })?;

    // 初始化数据库
    db::initialize_db(pool.clone())
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("数据库初始化错误: {}", e)))?;

    let storage = StorageManager::new(
        Arc::new(PgConfigStore::new(pool.clone())),
        ProviderRegistry::new(config.remote_timeout),
        config.alist_concurrency,
    );
    let catalog: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(pool));

    let app_state = web::Data::new(AppState {
        storage,
        importer: ImportCoordinator::new(catalog.clone()),
        catalog,
    });

    info!("服务器启动在 http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .configure(api::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
