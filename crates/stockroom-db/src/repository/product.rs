//! # Product Repository
//!
//! Database operations for catalog products.
//!
//! ## Key Operations
//! - Filtered listing (search, category, status, flags, price band, stock)
//! - CRUD with slug and SKU uniqueness checks
//! - Stock adjustment by delta, recorded in the movement ledger
//! - Delete together with the product's media rows
//!
//! ## Delete Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DELETE /api/products/{id}                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  media().all_for_product(id) ──► storage: remove each file             │
//! │       │                          (missing file = warning, continue)    │
//! │       ▼                                                                 │
//! │  products().delete(id)                                                 │
//! │    BEGIN                                                                │
//! │      DELETE FROM product_media WHERE product_id = ?                    │
//! │      DELETE FROM products WHERE id = ?        (0 rows → NotFound)      │
//! │    COMMIT                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use stockroom_core::{CoreError, MovementType, Product, ProductStatus, StockMovement, ValidationError};
use tracing::{debug, info};
use uuid::Uuid;

use super::movement::record_movement;
use super::{is_ascending, like_pattern, Page, PageRequest};
use crate::error::{DbError, DbResult};

/// Default page size for product listings.
pub const DEFAULT_PRODUCT_LIMIT: u32 = 20;

/// Query-string filters for `GET /api/products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductFilter {
    /// Substring of name, SKU or description.
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub status: Option<ProductStatus>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    /// Lower bound on selling price, cents.
    pub min_price: Option<i64>,
    /// Upper bound on selling price, cents.
    pub max_price: Option<i64>,
    /// `false` keeps products at or below their minimum stock level.
    pub in_stock: Option<bool>,
    /// `name`, `created_at` (default), `selling_price` or `stock_quantity`.
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default).
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductFilter {
    fn push_filters(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1 = 1");

        if let Some(pattern) = like_pattern(self.search.as_deref()) {
            qb.push(" AND (name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR sku LIKE ")
                .push_bind(pattern.clone())
                .push(" OR description LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category_id) = self.category_id.as_deref().filter(|c| !c.is_empty()) {
            qb.push(" AND category_id = ").push_bind(category_id.to_string());
        }
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(active) = self.is_active {
            qb.push(" AND is_active = ").push_bind(active);
        }
        if let Some(featured) = self.is_featured {
            qb.push(" AND is_featured = ").push_bind(featured);
        }
        if let Some(min) = self.min_price {
            qb.push(" AND selling_price_cents >= ").push_bind(min);
        }
        if let Some(max) = self.max_price {
            qb.push(" AND selling_price_cents <= ").push_bind(max);
        }
        match self.in_stock {
            Some(true) => {
                qb.push(" AND stock_quantity > min_stock_level");
            }
            Some(false) => {
                qb.push(" AND stock_quantity <= min_stock_level");
            }
            None => {}
        }
    }

    fn order_clause(&self) -> String {
        let column = match self.sort_by.as_deref() {
            Some("name") => "name",
            Some("selling_price") => "selling_price_cents",
            Some("stock_quantity") => "stock_quantity",
            _ => "created_at",
        };
        let direction = if is_ascending(self.sort_order.as_deref(), false) {
            "ASC"
        } else {
            "DESC"
        };
        format!(" ORDER BY {column} {direction}, id ASC")
    }
}

/// Catalog headline numbers for `GET /api/products/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct ProductStats {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
    pub archived: i64,
    pub active: i64,
    pub featured: i64,
    /// Tracked products at or below their minimum level (but not zero).
    pub low_stock: i64,
    /// Tracked products with nothing left.
    pub out_of_stock: i64,
    pub average_selling_price_cents: i64,
    /// Σ stock × cost (selling price when cost is unknown).
    pub total_stock_value_cents: i64,
    /// Created in the last 30 days.
    pub recent: i64,
}

fn rule(message: &str) -> CoreError {
    CoreError::Validation(ValidationError::Rule(message.to_string()))
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let page = repo.list(&ProductFilter::default()).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Filtered, sorted, paginated listing.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Page<Product>> {
        let page = PageRequest::new(filter.page, filter.limit, DEFAULT_PRODUCT_LIMIT);
        debug!(?filter, page = page.page, limit = page.limit, "Listing products");

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
        filter.push_filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM products");
        filter.push_filters(&mut query);
        query
            .push(filter.order_clause())
            .push(" LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = query.build_query_as::<Product>().fetch_all(&self.pool).await?;

        debug!(count = items.len(), total, "Product page loaded");
        Ok(Page {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Product> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// True when a product other than `exclude_id` owns `slug`.
    pub async fn slug_taken(&self, slug: &str, exclude_id: Option<&str>) -> DbResult<bool> {
        self.value_taken("slug", slug, exclude_id).await
    }

    /// True when a product other than `exclude_id` owns `sku`.
    pub async fn sku_taken(&self, sku: &str, exclude_id: Option<&str>) -> DbResult<bool> {
        self.value_taken("sku", sku, exclude_id).await
    }

    async fn value_taken(&self, column: &str, value: &str, exclude_id: Option<&str>) -> DbResult<bool> {
        // `column` is always one of the two literals above.
        let sql = format!("SELECT id FROM products WHERE {column} = ?");
        let found: Option<String> = sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some_and(|id| Some(id.as_str()) != exclude_id))
    }

    /// Category must exist; slug and SKU must be free.
    async fn check_references(&self, product: &Product, exclude_id: Option<&str>) -> DbResult<()> {
        let category: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE id = ?")
            .bind(&product.category_id)
            .fetch_optional(&self.pool)
            .await?;
        if category.is_none() {
            return Err(rule("Category not found").into());
        }
        if self.slug_taken(&product.slug, exclude_id).await? {
            return Err(CoreError::slug_conflict("Product", &product.slug).into());
        }
        if let Some(sku) = &product.sku {
            if self.sku_taken(sku, exclude_id).await? {
                return Err(rule("Product with this SKU already exists").into());
            }
        }
        Ok(())
    }

    /// Inserts a validated product after checking slug and SKU.
    pub async fn create(&self, product: &Product) -> DbResult<()> {
        self.check_references(product, None).await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, slug, description, category_id, sku, barcode, brand,
                base_price_cents, selling_price_cents, cost_price_cents,
                discount_bps, tax_rate_bps,
                stock_quantity, min_stock_level, max_stock_level, track_inventory,
                status, is_active, is_featured, is_digital, requires_shipping,
                weight_grams, featured_image_url, gallery_images, meta_keywords,
                attributes, created_at, updated_at
            ) VALUES (
                ?, ?, ?, ?, ?, ?, ?, ?,
                ?, ?, ?,
                ?, ?,
                ?, ?, ?, ?,
                ?, ?, ?, ?, ?,
                ?, ?, ?, ?,
                ?, ?, ?
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(&product.category_id)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.brand)
        .bind(product.base_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.cost_price_cents)
        .bind(product.discount_bps)
        .bind(product.tax_rate_bps)
        .bind(product.stock_quantity)
        .bind(product.min_stock_level)
        .bind(product.max_stock_level)
        .bind(product.track_inventory)
        .bind(product.status)
        .bind(product.is_active)
        .bind(product.is_featured)
        .bind(product.is_digital)
        .bind(product.requires_shipping)
        .bind(product.weight_grams)
        .bind(&product.featured_image_url)
        .bind(sqlx::types::Json(&product.gallery_images))
        .bind(sqlx::types::Json(&product.meta_keywords))
        .bind(sqlx::types::Json(&product.attributes))
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %product.id, slug = %product.slug, "Product created");
        Ok(())
    }

    /// Writes every mutable column of an already merged product.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        self.check_references(product, Some(&product.id)).await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?, slug = ?, description = ?, category_id = ?, sku = ?,
                barcode = ?, brand = ?,
                base_price_cents = ?, selling_price_cents = ?, cost_price_cents = ?,
                discount_bps = ?, tax_rate_bps = ?,
                stock_quantity = ?, min_stock_level = ?, max_stock_level = ?,
                track_inventory = ?, status = ?, is_active = ?, is_featured = ?,
                is_digital = ?, requires_shipping = ?, weight_grams = ?,
                featured_image_url = ?, gallery_images = ?, meta_keywords = ?,
                attributes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(&product.category_id)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.brand)
        .bind(product.base_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.cost_price_cents)
        .bind(product.discount_bps)
        .bind(product.tax_rate_bps)
        .bind(product.stock_quantity)
        .bind(product.min_stock_level)
        .bind(product.max_stock_level)
        .bind(product.track_inventory)
        .bind(product.status)
        .bind(product.is_active)
        .bind(product.is_featured)
        .bind(product.is_digital)
        .bind(product.requires_shipping)
        .bind(product.weight_grams)
        .bind(&product.featured_image_url)
        .bind(sqlx::types::Json(&product.gallery_images))
        .bind(sqlx::types::Json(&product.meta_keywords))
        .bind(sqlx::types::Json(&product.attributes))
        .bind(product.updated_at)
        .bind(&product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        debug!(id = %product.id, "Product updated");
        Ok(())
    }

    /// Sets the publication status directly.
    pub async fn set_status(&self, id: &str, status: ProductStatus) -> DbResult<Product> {
        let result = sqlx::query("UPDATE products SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(id = %id, status = %status, "Product status changed");
        self.get_by_id(id).await
    }

    /// Adds `delta` (may be negative) to the stock level and writes a
    /// `stock_movements` row in the same transaction.
    ///
    /// ## Errors
    /// - `NotFound` when the product doesn't exist
    /// - `Validation` when the new level leaves the `i64` range
    /// - `InsufficientStock` when a tracked product would drop below zero
    pub async fn adjust_stock(&self, id: &str, delta: i64, reason: Option<&str>) -> DbResult<Product> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        let quantity = delta
            .checked_abs()
            .ok_or_else(|| rule("Stock adjustment is out of range"))?;
        let next = product.stock_after(delta)?;

        sqlx::query("UPDATE products SET stock_quantity = ?, updated_at = ? WHERE id = ?")
            .bind(next)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        record_movement(
            &mut tx,
            &StockMovement {
                id: Uuid::new_v4().to_string(),
                product_id: product.id,
                product_name: Some(product.name),
                movement_type: MovementType::for_delta(delta),
                quantity,
                previous_stock: product.stock_quantity,
                new_stock: next,
                reason: reason.map(str::to_string),
                reference: None,
                created_at: now,
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            id = %id,
            delta,
            stock = next,
            reason = reason.unwrap_or("unspecified"),
            "Stock adjusted"
        );
        self.get_by_id(id).await
    }

    /// Deletes the product and its media rows in one transaction.
    ///
    /// Files on disk are the caller's job and must be removed first.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let media = sqlx::query("DELETE FROM product_media WHERE product_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Err(DbError::not_found("Product", id));
        }

        tx.commit().await?;

        info!(id = %id, media_rows = media.rows_affected(), "Product deleted");
        Ok(())
    }

    /// Tracked products at or below their minimum level, emptiest first.
    pub async fn low_stock(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE track_inventory = 1 AND is_active = 1
              AND stock_quantity <= min_stock_level
            ORDER BY stock_quantity ASC, name ASC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Aggregate catalog numbers.
    pub async fn stats(&self) -> DbResult<ProductStats> {
        let since = Utc::now() - Duration::days(30);

        let stats = sqlx::query_as::<_, ProductStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN status = 'published' THEN 1 ELSE 0 END), 0) AS published,
                COALESCE(SUM(CASE WHEN status = 'draft' THEN 1 ELSE 0 END), 0) AS draft,
                COALESCE(SUM(CASE WHEN status = 'archived' THEN 1 ELSE 0 END), 0) AS archived,
                COALESCE(SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END), 0) AS active,
                COALESCE(SUM(CASE WHEN is_featured = 1 THEN 1 ELSE 0 END), 0) AS featured,
                COALESCE(SUM(CASE WHEN track_inventory = 1 AND stock_quantity > 0
                                   AND stock_quantity <= min_stock_level THEN 1 ELSE 0 END), 0) AS low_stock,
                COALESCE(SUM(CASE WHEN track_inventory = 1 AND stock_quantity <= 0
                                  THEN 1 ELSE 0 END), 0) AS out_of_stock,
                CAST(COALESCE(AVG(selling_price_cents), 0) AS INTEGER) AS average_selling_price_cents,
                COALESCE(SUM(stock_quantity * COALESCE(cost_price_cents, selling_price_cents)), 0)
                    AS total_stock_value_cents,
                COALESCE(SUM(CASE WHEN created_at >= ? THEN 1 ELSE 0 END), 0) AS recent
            FROM products
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use stockroom_core::input::{CategoryInput, ProductInput};
    use stockroom_core::Category;

    use super::*;
    use crate::{Database, DbConfig};

    /// Creates a category and returns its id.
    pub(crate) async fn seed_category(db: &Database, name: &str) -> String {
        let category = Category::create(
            CategoryInput {
                name: Some(name.into()),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        db.categories().create(&category).await.unwrap();
        category.id
    }

    pub(crate) fn product_input(name: &str, category_id: &str) -> ProductInput {
        ProductInput {
            name: Some(name.into()),
            category_id: Some(category_id.into()),
            base_price_cents: Some(1000),
            selling_price_cents: Some(1500),
            stock_quantity: Some(10),
            min_stock_level: Some(3),
            ..Default::default()
        }
    }

    /// Creates a product and returns it.
    pub(crate) async fn seed_product(db: &Database, name: &str, category_id: &str) -> Product {
        let product = Product::create(product_input(name, category_id), Utc::now()).unwrap();
        db.products().create(&product).await.unwrap();
        product
    }

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category_id = seed_category(&db, "Kitchen").await;
        (db, category_id)
    }

    #[tokio::test]
    async fn test_create_and_get_round_trips_json_columns() {
        let (db, cat) = setup().await;
        let mut input = product_input("Ceramic Mug", &cat);
        input.gallery_images = Some(vec!["a.jpg".into(), "b.jpg".into()]);
        input.attributes = Some(serde_json::json!({"color": "blue"}));
        let product = Product::create(input, Utc::now()).unwrap();
        db.products().create(&product).await.unwrap();

        let fetched = db.products().get_by_id(&product.id).await.unwrap();
        assert_eq!(fetched.gallery_images, vec!["a.jpg", "b.jpg"]);
        assert_eq!(fetched.attributes["color"], "blue");
        assert_eq!(fetched.status, ProductStatus::Draft);
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let (db, _) = setup().await;
        let err = db.products().get_by_id("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_with_other_products_slug_is_conflict() {
        let (db, cat) = setup().await;
        seed_product(&db, "Mug", &cat).await;
        let mut plate = seed_product(&db, "Plate", &cat).await;

        plate.slug = "mug".into();
        let err = db.products().update(&plate).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::SlugConflict { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let (db, cat) = setup().await;
        let mut input = product_input("Mug", &cat);
        input.sku = Some("MUG-1".into());
        db.products()
            .create(&Product::create(input.clone(), Utc::now()).unwrap())
            .await
            .unwrap();

        input.name = Some("Mug Two".into());
        let err = db
            .products()
            .create(&Product::create(input, Utc::now()).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_category_rejected() {
        let (db, _) = setup().await;
        let product = Product::create(product_input("Mug", "no-such-category"), Utc::now()).unwrap();
        let err = db.products().create(&product).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::Validation(ValidationError::Rule(ref m))) if m == "Category not found"
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let (db, cat) = setup().await;
        seed_product(&db, "Alpha Mug", &cat).await;
        let mut expensive = product_input("Beta Mug", &cat);
        expensive.selling_price_cents = Some(9000);
        db.products()
            .create(&Product::create(expensive, Utc::now()).unwrap())
            .await
            .unwrap();
        seed_product(&db, "Plate", &cat).await;

        let page = db
            .products()
            .list(&ProductFilter {
                search: Some("mug".into()),
                sort_by: Some("name".into()),
                sort_order: Some("asc".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].name, "Alpha Mug");

        let pricey = db
            .products()
            .list(&ProductFilter {
                min_price: Some(5000),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pricey.total, 1);
        assert_eq!(pricey.items[0].name, "Beta Mug");
    }

    #[tokio::test]
    async fn test_adjust_stock_refuses_negative_for_tracked() {
        let (db, cat) = setup().await;
        let product = seed_product(&db, "Mug", &cat).await;

        let updated = db.products().adjust_stock(&product.id, -4, Some("sale")).await.unwrap();
        assert_eq!(updated.stock_quantity, 6);

        let err = db.products().adjust_stock(&product.id, -7, None).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InsufficientStock { .. })));
        assert_eq!(db.products().get_by_id(&product.id).await.unwrap().stock_quantity, 6);
    }

    #[tokio::test]
    async fn test_adjust_stock_overflow_is_validation_error() {
        let (db, cat) = setup().await;
        let product = seed_product(&db, "Mug", &cat).await;

        for delta in [i64::MAX, i64::MIN] {
            let err = db.products().adjust_stock(&product.id, delta, None).await.unwrap_err();
            assert!(matches!(err, DbError::Core(CoreError::Validation(_))), "{delta}: {err}");
        }
        assert_eq!(db.products().get_by_id(&product.id).await.unwrap().stock_quantity, 10);
    }

    #[tokio::test]
    async fn test_adjust_stock_writes_movement() {
        let (db, cat) = setup().await;
        let product = seed_product(&db, "Mug", &cat).await;

        db.products().adjust_stock(&product.id, -4, Some("sale")).await.unwrap();
        let _ = db.products().adjust_stock(&product.id, -50, None).await;

        let movements = db.movements().for_product(&product.id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type, MovementType::Out);
        assert_eq!(movements[0].quantity, 4);
        assert_eq!(movements[0].previous_stock, 10);
        assert_eq!(movements[0].new_stock, 6);
        assert_eq!(movements[0].reason.as_deref(), Some("sale"));
    }

    #[tokio::test]
    async fn test_set_status() {
        let (db, cat) = setup().await;
        let product = seed_product(&db, "Mug", &cat).await;
        let published = db
            .products()
            .set_status(&product.id, ProductStatus::Published)
            .await
            .unwrap();
        assert_eq!(published.status, ProductStatus::Published);
        assert!(db
            .products()
            .set_status("missing", ProductStatus::Archived)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (db, cat) = setup().await;
        let product = seed_product(&db, "Mug", &cat).await;
        db.products().delete(&product.id).await.unwrap();
        assert!(db.products().delete(&product.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_stats_and_low_stock() {
        let (db, cat) = setup().await;
        seed_product(&db, "Mug", &cat).await;
        let low = seed_product(&db, "Plate", &cat).await;
        db.products().adjust_stock(&low.id, -8, None).await.unwrap();

        let stats = db.products().stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.draft, 2);
        assert_eq!(stats.low_stock, 1);
        assert_eq!(stats.out_of_stock, 0);
        assert_eq!(stats.average_selling_price_cents, 1500);
        assert_eq!(stats.recent, 2);

        let low_items = db.products().low_stock(10).await.unwrap();
        assert_eq!(low_items.len(), 1);
        assert_eq!(low_items[0].id, low.id);
    }
}
