//! # Dashboard Repository
//!
//! Cross-table headline numbers for the admin landing page.

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use stockroom_core::Product;

use super::product::ProductRepository;
use crate::error::DbResult;

/// Body of `GET /api/dashboard/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct DashboardStats {
    pub total_products: i64,
    pub active_products: i64,
    pub low_stock_products: i64,
    pub total_categories: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    /// Σ total over orders that were not cancelled.
    pub total_revenue_cents: i64,
    pub total_suppliers: i64,
    pub active_suppliers: i64,
}

#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    pub async fn stats(&self) -> DbResult<DashboardStats> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products) AS total_products,
                (SELECT COUNT(*) FROM products WHERE is_active = 1) AS active_products,
                (SELECT COUNT(*) FROM products
                  WHERE track_inventory = 1 AND stock_quantity <= min_stock_level) AS low_stock_products,
                (SELECT COUNT(*) FROM categories) AS total_categories,
                (SELECT COUNT(*) FROM orders) AS total_orders,
                (SELECT COUNT(*) FROM orders WHERE status = 'pending') AS pending_orders,
                (SELECT COALESCE(SUM(total_cents), 0) FROM orders
                  WHERE status != 'cancelled') AS total_revenue_cents,
                (SELECT COUNT(*) FROM suppliers) AS total_suppliers,
                (SELECT COUNT(*) FROM suppliers WHERE status = 'active') AS active_suppliers
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Tracked products at or below their minimum stock level.
    pub async fn low_stock(&self, limit: u32) -> DbResult<Vec<Product>> {
        ProductRepository::new(self.pool.clone()).low_stock(limit).await
    }
}
