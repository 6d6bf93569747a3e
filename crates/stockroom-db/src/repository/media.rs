//! # Media Repository
//!
//! Rows describing files attached to a product. The files themselves live
//! under the media root and are handled by the API's storage layer.
//!
//! ## Primary Image
//! ```text
//! create(): first image of a product, or an image uploaded as primary
//! set_primary(product, media):
//!   BEGIN
//!     SELECT media WHERE id = ? AND product_id = ?   (none → NotFound)
//!     UPDATE product_media SET is_primary = 0 WHERE product_id = ? AND media_type = 'image'
//!     UPDATE product_media SET is_primary = 1 WHERE id = ?
//!     UPDATE products SET featured_image_url = media.url
//!   COMMIT
//! ```
//!
//! Only images take part: a product's videos and documents keep their
//! flags when the primary image changes.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use stockroom_core::input::NewMedia;
use stockroom_core::{CoreError, Media, MediaType, ValidationError};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

/// Repository for product media rows.
#[derive(Debug, Clone)]
pub struct MediaRepository {
    pool: SqlitePool,
}

impl MediaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MediaRepository { pool }
    }

    /// Active media for a product, optionally of one type.
    pub async fn list_for_product(
        &self,
        product_id: &str,
        media_type: Option<MediaType>,
    ) -> DbResult<Vec<Media>> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM product_media WHERE product_id = ");
        query.push_bind(product_id.to_string()).push(" AND is_active = 1");
        if let Some(media_type) = media_type {
            query.push(" AND media_type = ").push_bind(media_type);
        }
        query.push(" ORDER BY display_order ASC, created_at DESC");

        let media = query.build_query_as::<Media>().fetch_all(&self.pool).await?;
        debug!(product_id = %product_id, count = media.len(), "Media listed");
        Ok(media)
    }

    /// Every row for a product, inactive ones included.
    pub async fn all_for_product(&self, product_id: &str) -> DbResult<Vec<Media>> {
        let media = sqlx::query_as::<_, Media>(
            "SELECT * FROM product_media WHERE product_id = ? ORDER BY display_order ASC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(media)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Media> {
        sqlx::query_as::<_, Media>("SELECT * FROM product_media WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Media", id))
    }

    /// Registers a stored file for `product_id`, appended after the
    /// existing media.
    ///
    /// An image becomes primary when it is the product's first image or
    /// when `make_primary` is set; the product's featured image follows.
    pub async fn create(
        &self,
        product_id: &str,
        input: NewMedia,
        url: String,
        make_primary: bool,
    ) -> DbResult<Media> {
        let mut tx = self.pool.begin().await?;

        let product: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;
        if product.is_none() {
            return Err(DbError::not_found("Product", product_id));
        }

        let (next_order, images): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(MAX(display_order) + 1, 0),
                COALESCE(SUM(CASE WHEN media_type = 'image' THEN 1 ELSE 0 END), 0)
            FROM product_media
            WHERE product_id = ?
            "#,
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        let is_primary = input.media_type == MediaType::Image && (images == 0 || make_primary);
        let media = Media::create(product_id, input, url, next_order, is_primary, Utc::now())
            .map_err(CoreError::from)?;
        if is_primary {
            clear_primary_image(&mut tx, product_id).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO product_media (
                id, product_id, file_name, file_path, url, media_type, mime_type,
                file_size_bytes, alt_text, caption, is_primary, display_order,
                is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&media.id)
        .bind(&media.product_id)
        .bind(&media.file_name)
        .bind(&media.file_path)
        .bind(&media.url)
        .bind(media.media_type)
        .bind(&media.mime_type)
        .bind(media.file_size_bytes)
        .bind(&media.alt_text)
        .bind(&media.caption)
        .bind(media.is_primary)
        .bind(media.display_order)
        .bind(media.is_active)
        .bind(media.created_at)
        .bind(media.updated_at)
        .execute(&mut *tx)
        .await?;

        if media.is_primary {
            set_featured_image(&mut tx, product_id, Some(&media.url), media.created_at).await?;
        }

        tx.commit().await?;

        info!(
            id = %media.id,
            product_id = %product_id,
            primary = media.is_primary,
            "Media registered"
        );
        Ok(media)
    }

    /// Writes the mutable metadata columns.
    pub async fn update(&self, media: &Media) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE product_media SET
                alt_text = ?, caption = ?, display_order = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&media.alt_text)
        .bind(&media.caption)
        .bind(media.display_order)
        .bind(media.is_active)
        .bind(media.updated_at)
        .bind(&media.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Media", &media.id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM product_media WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Media", id));
        }

        info!(id = %id, "Media deleted");
        Ok(())
    }

    /// Makes `media_id` the product's only primary image and copies its
    /// URL to the product's featured image.
    ///
    /// ## Errors
    /// - `NotFound` when the media doesn't exist or belongs to another product
    /// - `Validation` when the media is not an image
    pub async fn set_primary(&self, product_id: &str, media_id: &str) -> DbResult<Media> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let media = sqlx::query_as::<_, Media>(
            "SELECT * FROM product_media WHERE id = ? AND product_id = ?",
        )
        .bind(media_id)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Media", media_id))?;
        if media.media_type != MediaType::Image {
            return Err(CoreError::from(ValidationError::Rule(
                "Only images can be the primary media".into(),
            ))
            .into());
        }

        clear_primary_image(&mut tx, product_id).await?;
        sqlx::query("UPDATE product_media SET is_primary = 1, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(media_id)
            .execute(&mut *tx)
            .await?;
        set_featured_image(&mut tx, product_id, Some(&media.url), now).await?;

        tx.commit().await?;

        info!(product_id = %product_id, media_id = %media_id, "Primary media set");
        self.get_by_id(media_id).await
    }

    /// Sets each listed row's display order to its position in `media_ids`.
    /// Ids that belong to another product are skipped.
    pub async fn reorder(&self, product_id: &str, media_ids: &[String]) -> DbResult<Vec<Media>> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let product: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;
        if product.is_none() {
            return Err(DbError::not_found("Product", product_id));
        }

        for (position, id) in media_ids.iter().enumerate() {
            sqlx::query(
                "UPDATE product_media SET display_order = ?, updated_at = ? WHERE id = ? AND product_id = ?",
            )
            .bind(position as i64)
            .bind(now)
            .bind(id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(product_id = %product_id, count = media_ids.len(), "Media reordered");
        self.list_for_product(product_id, None).await
    }
}

async fn clear_primary_image(conn: &mut SqliteConnection, product_id: &str) -> DbResult<()> {
    sqlx::query(
        "UPDATE product_media SET is_primary = 0 WHERE product_id = ? AND media_type = 'image' AND is_primary = 1",
    )
    .bind(product_id)
    .execute(conn)
    .await?;
    Ok(())
}

async fn set_featured_image(
    conn: &mut SqliteConnection,
    product_id: &str,
    url: Option<&str>,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query("UPDATE products SET featured_image_url = ?, updated_at = ? WHERE id = ?")
        .bind(url)
        .bind(now)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::tests::{seed_category, seed_product};
    use crate::{Database, DbConfig};

    fn upload(name: &str, media_type: MediaType) -> NewMedia {
        NewMedia {
            file_name: name.into(),
            file_path: format!("products/{name}"),
            media_type,
            mime_type: None,
            file_size_bytes: 1024,
            alt_text: None,
            caption: None,
        }
    }

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cat = seed_category(&db, "Kitchen").await;
        let product = seed_product(&db, "Mug", &cat).await;
        (db, product.id)
    }

    #[tokio::test]
    async fn test_first_image_becomes_primary() {
        let (db, pid) = setup().await;
        let repo = db.media();

        let manual = repo
            .create(&pid, upload("manual.pdf", MediaType::Document), "/m/manual.pdf".into(), false)
            .await
            .unwrap();
        let first = repo
            .create(&pid, upload("a.jpg", MediaType::Image), "/m/a.jpg".into(), false)
            .await
            .unwrap();
        let second = repo
            .create(&pid, upload("b.jpg", MediaType::Image), "/m/b.jpg".into(), false)
            .await
            .unwrap();

        assert!(!manual.is_primary);
        assert!(first.is_primary);
        assert!(!second.is_primary);
        assert_eq!(second.display_order, 2);
    }

    #[tokio::test]
    async fn test_create_for_missing_product_is_not_found() {
        let (db, _) = setup().await;
        let err = db
            .media()
            .create("missing", upload("a.jpg", MediaType::Image), "/m/a.jpg".into(), false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_set_primary_switches_and_checks_owner() {
        let (db, pid) = setup().await;
        let repo = db.media();
        let a = repo.create(&pid, upload("a.jpg", MediaType::Image), "a".into(), false).await.unwrap();
        let b = repo.create(&pid, upload("b.jpg", MediaType::Image), "b".into(), false).await.unwrap();

        repo.set_primary(&pid, &b.id).await.unwrap();
        assert!(!repo.get_by_id(&a.id).await.unwrap().is_primary);
        assert!(repo.get_by_id(&b.id).await.unwrap().is_primary);

        let err = repo.set_primary("other-product", &a.id).await.unwrap_err();
        assert!(err.is_not_found());
        // The failed switch rolled back; b is still primary.
        assert!(repo.get_by_id(&b.id).await.unwrap().is_primary);
    }

    #[tokio::test]
    async fn test_reorder_and_filter_by_type() {
        let (db, pid) = setup().await;
        let repo = db.media();
        let a = repo.create(&pid, upload("a.jpg", MediaType::Image), "a".into(), false).await.unwrap();
        let b = repo.create(&pid, upload("b.mp4", MediaType::Video), "b".into(), false).await.unwrap();

        let ordered = repo.reorder(&pid, &[b.id.clone(), a.id.clone()]).await.unwrap();
        assert_eq!(ordered[0].id, b.id);
        assert_eq!(ordered[1].id, a.id);

        let videos = repo.list_for_product(&pid, Some(MediaType::Video)).await.unwrap();
        assert_eq!(videos.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (db, pid) = setup().await;
        let repo = db.media();
        let mut media = repo.create(&pid, upload("a.jpg", MediaType::Image), "a".into(), false).await.unwrap();

        media.alt_text = Some("A mug".into());
        media.is_active = false;
        repo.update(&media).await.unwrap();
        assert!(repo.list_for_product(&pid, None).await.unwrap().is_empty());
        assert_eq!(repo.all_for_product(&pid).await.unwrap().len(), 1);

        repo.delete(&media.id).await.unwrap();
        assert!(repo.delete(&media.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_product_delete_removes_media_rows() {
        let (db, pid) = setup().await;
        db.media().create(&pid, upload("a.jpg", MediaType::Image), "a".into(), false).await.unwrap();
        db.products().delete(&pid).await.unwrap();
        assert!(db.media().all_for_product(&pid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_primary_image_syncs_featured_url() {
        let (db, pid) = setup().await;
        let repo = db.media();
        let a = repo.create(&pid, upload("a.jpg", MediaType::Image), "/m/a.jpg".into(), false).await.unwrap();
        assert_eq!(
            db.products().get_by_id(&pid).await.unwrap().featured_image_url.as_deref(),
            Some("/m/a.jpg")
        );

        let b = repo.create(&pid, upload("b.jpg", MediaType::Image), "/m/b.jpg".into(), true).await.unwrap();
        assert!(b.is_primary);
        assert!(!repo.get_by_id(&a.id).await.unwrap().is_primary);
        assert_eq!(
            db.products().get_by_id(&pid).await.unwrap().featured_image_url.as_deref(),
            Some("/m/b.jpg")
        );

        repo.set_primary(&pid, &a.id).await.unwrap();
        assert_eq!(
            db.products().get_by_id(&pid).await.unwrap().featured_image_url.as_deref(),
            Some("/m/a.jpg")
        );
    }

    #[tokio::test]
    async fn test_set_primary_only_touches_images() {
        let (db, pid) = setup().await;
        let repo = db.media();
        let image = repo.create(&pid, upload("a.jpg", MediaType::Image), "a".into(), false).await.unwrap();
        let video = repo.create(&pid, upload("b.mp4", MediaType::Video), "b".into(), true).await.unwrap();
        assert!(!video.is_primary);

        let err = repo.set_primary(&pid, &video.id).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        assert!(repo.get_by_id(&image.id).await.unwrap().is_primary);
    }

    #[tokio::test]
    async fn test_reorder_unknown_product_is_not_found() {
        let (db, _) = setup().await;
        let err = db.media().reorder("missing", &["x".to_string()]).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
