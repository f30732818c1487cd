use crate::catalog::model::{CatalogError, ImageId, NewImage};
use crate::catalog::store::CatalogStore;
use async_trait::async_trait;
use log::debug;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn create_image_in_album(&self, image: &NewImage, album: &str) -> Result<ImageId, CatalogError> {
        let id = Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO images (id, url, title, width, height, dimensions_estimated, type, show, show_on_mainpage, sort, del)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0)
            "#,
        )
        .bind(&id)
        .bind(&image.url)
        .bind(&image.title)
        .bind(image.width)
        .bind(image.height)
        .bind(image.dimensions_estimated)
        .bind(image.image_type)
        .bind(image.show)
        .bind(image.show_on_mainpage)
        .bind(image.sort)
        .execute(&mut tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO images_albums_relation (image_id, album_value) VALUES ($1, $2)
            "#,
        )
        .bind(&id)
        .bind(album)
        .execute(&mut tx)
        .await?;

        tx.commit().await?;
        debug!("创建图片 {} 并关联相册 {}", id, album);
        Ok(id)
    }

    async fn soft_delete_images(&self, ids: &[String]) -> Result<u64, CatalogError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM images_albums_relation WHERE image_id = ANY($1)")
            .bind(ids.to_vec())
            .execute(&mut tx)
            .await?;

        let result = sqlx::query(
            r#"
            UPDATE images SET del = 1, updated_at = NOW() WHERE id = ANY($1) AND del = 0
            "#,
        )
        .bind(ids.to_vec())
        .execute(&mut tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn update_mainpage(&self, ids: &[String], show_on_mainpage: i16) -> Result<u64, CatalogError> {
        let result = sqlx::query(
            r#"
            UPDATE images SET show_on_mainpage = $1, updated_at = NOW() WHERE id = ANY($2) AND del = 0
            "#,
        )
        .bind(show_on_mainpage)
        .bind(ids.to_vec())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn update_show(&self, id: &str, show: i16) -> Result<(), CatalogError> {
        let result = sqlx::query(
            r#"
            UPDATE images SET show = $1, updated_at = NOW() WHERE id = $2 AND del = 0
            "#,
        )
        .bind(show)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("图片不存在: {}", id)));
        }
        Ok(())
    }

    async fn rebind_album(&self, id: &str, album: &str) -> Result<(), CatalogError> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM images WHERE id = $1 AND del = 0)")
                .bind(id)
                .fetch_one(&mut tx)
                .await?;
        if !exists {
            return Err(CatalogError::NotFound(format!("图片不存在: {}", id)));
        }

        sqlx::query("DELETE FROM images_albums_relation WHERE image_id = $1")
            .bind(id)
            .execute(&mut tx)
            .await?;

        sqlx::query("INSERT INTO images_albums_relation (image_id, album_value) VALUES ($1, $2)")
            .bind(id)
            .bind(album)
            .execute(&mut tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
