pub mod configs;

use log::{error, info};
use sqlx::PgPool;
use thiserror::Error;

pub use configs::{ConfigStore, PgConfigStore};

#[derive(Debug, Error)]
#[error("{what}: {source}")]
pub struct InitError {
    what: &'static str,
    #[source]
    source: sqlx::Error,
}

fn init_error(what: &'static str) -> impl FnOnce(sqlx::Error) -> InitError {
    move |source| InitError { what, source }
}

pub struct DbInitializer {
    pool: PgPool,
}

impl DbInitializer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 初始化配置表
    pub async fn init_config_tables(&self) -> Result<(), InitError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS configs (
                id BIGSERIAL PRIMARY KEY,
                config_key VARCHAR NOT NULL UNIQUE,
                config_value TEXT,
                detail TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(init_error("创建配置表失败"))?;

        Ok(())
    }

    /// 初始化图片与相册关系表
    pub async fn init_image_tables(&self) -> Result<(), InitError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS images (
                id VARCHAR PRIMARY KEY,
                url TEXT NOT NULL,
                title TEXT NOT NULL DEFAULT '',
                preview_url TEXT NOT NULL DEFAULT '',
                video_url TEXT NOT NULL DEFAULT '',
                exif JSONB NOT NULL DEFAULT '{}'::jsonb,
                labels JSONB NOT NULL DEFAULT '[]'::jsonb,
                width INTEGER NOT NULL DEFAULT 0,
                height INTEGER NOT NULL DEFAULT 0,
                dimensions_estimated BOOLEAN NOT NULL DEFAULT false,
                detail TEXT NOT NULL DEFAULT '',
                lat TEXT NOT NULL DEFAULT '',
                lon TEXT NOT NULL DEFAULT '',
                type SMALLINT NOT NULL DEFAULT 1,
                show SMALLINT NOT NULL DEFAULT 1,
                show_on_mainpage SMALLINT NOT NULL DEFAULT 1,
                sort SMALLINT NOT NULL DEFAULT 0,
                del SMALLINT NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(init_error("创建图片表失败"))?;

        // 每张图片只有一条有效的相册关系
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS images_albums_relation (
                image_id VARCHAR PRIMARY KEY REFERENCES images(id),
                album_value VARCHAR NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(init_error("创建相册关系表失败"))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_relation_album ON images_albums_relation(album_value)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(init_error("创建索引失败"))?;

        Ok(())
    }
}

/// 初始化所有数据库表
pub async fn initialize_db(pool: PgPool) -> Result<(), InitError> {
    info!("开始初始化数据库...");
    let initializer = DbInitializer::new(pool);

    initializer.init_config_tables().await.map_err(|e| {
        error!("配置表初始化失败: {:?}", e);
        e
    })?;

    initializer.init_image_tables().await.map_err(|e| {
        error!("图片表初始化失败: {:?}", e);
        e
    })?;

    info!("数据库初始化完成");
    Ok(())
}
