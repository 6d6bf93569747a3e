//! # Category Repository
//!
//! Catalog tree nodes. Slugs are unique; a category with products or
//! children cannot be deleted.
//!
//! A parent must exist, and following parents upward from a category must
//! never lead back to it.

use std::collections::HashSet;

use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use stockroom_core::{Category, CategoryNode, CategoryStats, CoreError, ValidationError};
use tracing::{debug, info};

use super::{is_ascending, like_pattern, Page, PageRequest};
use crate::error::{DbError, DbResult};

/// Default page size for category listings.
pub const DEFAULT_CATEGORY_LIMIT: u32 = 20;

/// Query-string filters for `GET /api/categories`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryFilter {
    /// Substring of name or description.
    pub search: Option<String>,
    /// `root` (or empty) for top-level categories, otherwise a parent id.
    pub parent_id: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    /// `sort_order` (default), `name` or `created_at`.
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl CategoryFilter {
    fn push_filters(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1 = 1");

        if let Some(pattern) = like_pattern(self.search.as_deref()) {
            qb.push(" AND (name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR description LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        match self.parent_id.as_deref().map(str::trim) {
            None => {}
            Some("") | Some("root") => {
                qb.push(" AND parent_id IS NULL");
            }
            Some(parent) => {
                qb.push(" AND parent_id = ").push_bind(parent.to_string());
            }
        }
        if let Some(active) = self.is_active {
            qb.push(" AND is_active = ").push_bind(active);
        }
        if let Some(featured) = self.is_featured {
            qb.push(" AND is_featured = ").push_bind(featured);
        }
    }

    fn order_clause(&self) -> String {
        let column = match self.sort_by.as_deref() {
            Some("name") => "name",
            Some("created_at") => "created_at",
            _ => "sort_order",
        };
        let direction = if is_ascending(self.sort_order.as_deref(), true) {
            "ASC"
        } else {
            "DESC"
        };
        format!(" ORDER BY {column} {direction}, name ASC")
    }
}

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Filtered, sorted, paginated listing.
    pub async fn list(&self, filter: &CategoryFilter) -> DbResult<Page<Category>> {
        let page = PageRequest::new(filter.page, filter.limit, DEFAULT_CATEGORY_LIMIT);
        debug!(?filter, page = page.page, limit = page.limit, "Listing categories");

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM categories");
        filter.push_filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM categories");
        filter.push_filters(&mut query);
        query
            .push(filter.order_clause())
            .push(" LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = query.build_query_as::<Category>().fetch_all(&self.pool).await?;

        Ok(Page {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    /// Gets a category by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// True when a category other than `exclude_id` owns `slug`.
    pub async fn slug_taken(&self, slug: &str, exclude_id: Option<&str>) -> DbResult<bool> {
        let found: Option<String> = sqlx::query_scalar("SELECT id FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some_and(|id| Some(id.as_str()) != exclude_id))
    }

    /// Rejects a missing parent or a parent chain that reaches `category`.
    async fn check_parent(&self, category: &Category) -> DbResult<()> {
        let Some(parent_id) = category.parent_id.as_deref() else {
            return Ok(());
        };
        let rule = |message: &str| -> DbError {
            CoreError::Validation(ValidationError::Rule(message.to_string())).into()
        };

        let mut seen = HashSet::new();
        let mut current = parent_id.to_string();
        loop {
            if current == category.id {
                return Err(rule("A category cannot be nested under its own descendant"));
            }
            if !seen.insert(current.clone()) {
                return Ok(());
            }
            let row: Option<Option<String>> =
                sqlx::query_scalar("SELECT parent_id FROM categories WHERE id = ?")
                    .bind(&current)
                    .fetch_optional(&self.pool)
                    .await?;
            match row {
                None if current == parent_id => return Err(rule("Parent category not found")),
                None | Some(None) => return Ok(()),
                Some(Some(next)) => current = next,
            }
        }
    }

    /// Inserts a new category after checking its slug and parent.
    pub async fn create(&self, category: &Category) -> DbResult<()> {
        if self.slug_taken(&category.slug, None).await? {
            return Err(CoreError::slug_conflict("Category", &category.slug).into());
        }
        self.check_parent(category).await?;

        sqlx::query(
            r#"
            INSERT INTO categories (
                id, name, slug, description, parent_id, image_url,
                sort_order, is_active, is_featured, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(&category.parent_id)
        .bind(&category.image_url)
        .bind(category.sort_order)
        .bind(category.is_active)
        .bind(category.is_featured)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %category.id, slug = %category.slug, "Category created");
        Ok(())
    }

    /// Writes every mutable column of an already merged category.
    pub async fn update(&self, category: &Category) -> DbResult<()> {
        if self.slug_taken(&category.slug, Some(&category.id)).await? {
            return Err(CoreError::slug_conflict("Category", &category.slug).into());
        }
        self.check_parent(category).await?;

        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = ?, slug = ?, description = ?, parent_id = ?, image_url = ?,
                sort_order = ?, is_active = ?, is_featured = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(&category.parent_id)
        .bind(&category.image_url)
        .bind(category.sort_order)
        .bind(category.is_active)
        .bind(category.is_featured)
        .bind(category.updated_at)
        .bind(&category.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", &category.id));
        }

        debug!(id = %category.id, "Category updated");
        Ok(())
    }

    /// Active categories nested by parent, siblings by name.
    pub async fn tree(&self) -> DbResult<Vec<CategoryNode>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE is_active = 1 ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(CategoryNode::build_tree(categories))
    }

    pub async fn stats(&self) -> DbResult<CategoryStats> {
        let stats = sqlx::query_as::<_, CategoryStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END), 0) AS active,
                COALESCE(SUM(CASE WHEN is_active = 0 THEN 1 ELSE 0 END), 0) AS inactive,
                COALESCE(SUM(CASE WHEN parent_id IS NULL THEN 1 ELSE 0 END), 0) AS root_categories
            FROM categories
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    /// Deletes a category that nothing references.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let category = self.get_by_id(id).await?;

        let (products, children): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products WHERE category_id = ?1),
                (SELECT COUNT(*) FROM categories WHERE parent_id = ?1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if products > 0 || children > 0 {
            return Err(CoreError::InUse {
                entity: format!("category '{}'", category.name),
                reason: format!("{products} products and {children} subcategories reference it"),
            }
            .into());
        }

        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(id = %id, "Category deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use stockroom_core::input::CategoryInput;

    use super::*;
    use crate::{Database, DbConfig};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn category(name: &str) -> Category {
        Category::create(
            CategoryInput {
                name: Some(name.into()),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = setup().await;
        let repo = db.categories();
        let cat = category("Kitchen");
        repo.create(&cat).await.unwrap();

        let fetched = repo.get_by_id(&cat.id).await.unwrap();
        assert_eq!(fetched.slug, "kitchen");
        assert!(repo.exists(&cat.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let db = setup().await;
        let repo = db.categories();
        repo.create(&category("Kitchen")).await.unwrap();

        let err = repo.create(&category("kitchen!")).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::SlugConflict { .. })));
    }

    #[tokio::test]
    async fn test_update_onto_other_slug_rejected() {
        let db = setup().await;
        let repo = db.categories();
        repo.create(&category("Kitchen")).await.unwrap();
        let mut garden = category("Garden");
        repo.create(&garden).await.unwrap();

        garden.slug = "kitchen".into();
        assert!(repo.update(&garden).await.is_err());
    }

    #[tokio::test]
    async fn test_list_filters_root_and_search() {
        let db = setup().await;
        let repo = db.categories();
        let parent = category("Outdoor");
        repo.create(&parent).await.unwrap();
        let mut child = category("Tents");
        child.parent_id = Some(parent.id.clone());
        repo.create(&child).await.unwrap();

        let roots = repo
            .list(&CategoryFilter {
                parent_id: Some("root".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(roots.total, 1);
        assert_eq!(roots.items[0].name, "Outdoor");

        let found = repo
            .list(&CategoryFilter {
                search: Some("ten".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].id, child.id);
    }

    #[tokio::test]
    async fn test_delete_refused_with_children() {
        let db = setup().await;
        let repo = db.categories();
        let parent = category("Outdoor");
        repo.create(&parent).await.unwrap();
        let mut child = category("Tents");
        child.parent_id = Some(parent.id.clone());
        repo.create(&child).await.unwrap();

        let err = repo.delete(&parent.id).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InUse { .. })));

        repo.delete(&child.id).await.unwrap();
        repo.delete(&parent.id).await.unwrap();
        assert!(repo.get_by_id(&parent.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_missing_parent_rejected() {
        let db = setup().await;
        let mut orphan = category("Orphan");
        orphan.parent_id = Some("ghost".into());

        let err = db.categories().create(&orphan).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        assert!(err.to_string().contains("Parent category not found"));
    }

    #[tokio::test]
    async fn test_parent_cycle_rejected() {
        let db = setup().await;
        let repo = db.categories();
        let a = category("A");
        repo.create(&a).await.unwrap();
        let mut b = category("B");
        b.parent_id = Some(a.id.clone());
        repo.create(&b).await.unwrap();
        let mut c = category("C");
        c.parent_id = Some(b.id.clone());
        repo.create(&c).await.unwrap();

        let mut moved = a.clone();
        moved.parent_id = Some(c.id.clone());
        let err = repo.update(&moved).await.unwrap_err();
        assert!(err.to_string().contains("own descendant"));
        assert_eq!(repo.get_by_id(&a.id).await.unwrap().parent_id, None);
    }

    #[tokio::test]
    async fn test_tree_and_stats() {
        let db = setup().await;
        let repo = db.categories();
        let outdoor = category("Outdoor");
        repo.create(&outdoor).await.unwrap();
        let mut tents = category("Tents");
        tents.parent_id = Some(outdoor.id.clone());
        repo.create(&tents).await.unwrap();
        let mut hidden = category("Hidden");
        hidden.is_active = false;
        repo.create(&hidden).await.unwrap();

        let tree = repo.tree().await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category.name, "Outdoor");
        assert_eq!(tree[0].children[0].category.name, "Tents");

        let stats = repo.stats().await.unwrap();
        assert_eq!(
            stats,
            CategoryStats { total: 3, active: 2, inactive: 1, root_categories: 2 }
        );
    }
}
