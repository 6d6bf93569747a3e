//! # Stock Movement Repository
//!
//! Append-only ledger of stock changes. Rows are written by
//! `ProductRepository::adjust_stock` inside its transaction; this module
//! only reads them back.

use chrono::{Duration, NaiveTime, Utc};
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use stockroom_core::{MovementSummary, MovementType, StockMovement};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Look-back window when the query names none.
pub const DEFAULT_MOVEMENT_DAYS: i64 = 30;

/// Rows returned when the query names no limit.
pub const DEFAULT_MOVEMENT_LIMIT: i64 = 100;

const MAX_MOVEMENT_LIMIT: i64 = 1000;

const SELECT_MOVEMENTS: &str = "SELECT m.id, m.product_id, p.name AS product_name, m.movement_type, \
     m.quantity, m.previous_stock, m.new_stock, m.reason, m.reference, m.created_at \
     FROM stock_movements m LEFT JOIN products p ON p.id = m.product_id";

/// Query-string filters for `GET /api/movements`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MovementFilter {
    pub product_id: Option<String>,
    pub movement_type: Option<MovementType>,
    /// Only movements from the last `days` days.
    pub days: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Newest first, within the filter's window.
    pub async fn list(&self, filter: &MovementFilter) -> DbResult<Vec<StockMovement>> {
        let days = filter.days.unwrap_or(DEFAULT_MOVEMENT_DAYS).clamp(1, 3650);
        let limit = filter.limit.unwrap_or(DEFAULT_MOVEMENT_LIMIT).clamp(1, MAX_MOVEMENT_LIMIT);
        debug!(?filter, days, limit, "Listing stock movements");

        let mut query = QueryBuilder::<Sqlite>::new(SELECT_MOVEMENTS);
        query
            .push(" WHERE m.created_at >= ")
            .push_bind(Utc::now() - Duration::days(days));
        if let Some(product_id) = filter.product_id.as_deref().filter(|p| !p.is_empty()) {
            query.push(" AND m.product_id = ").push_bind(product_id.to_string());
        }
        if let Some(kind) = filter.movement_type {
            query.push(" AND m.movement_type = ").push_bind(kind);
        }
        query
            .push(" ORDER BY m.created_at DESC, m.id DESC LIMIT ")
            .push_bind(limit);

        Ok(query.build_query_as::<StockMovement>().fetch_all(&self.pool).await?)
    }

    /// Full history of one product, newest first. 404 when it is missing.
    pub async fn for_product(&self, product_id: &str) -> DbResult<Vec<StockMovement>> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Product", product_id));
        }

        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            "{SELECT_MOVEMENTS} WHERE m.product_id = ? ORDER BY m.created_at DESC, m.id DESC"
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    /// Ledger totals plus counts for today, the last 7 and the last 30 days.
    pub async fn summary(&self) -> DbResult<MovementSummary> {
        let now = Utc::now();
        let today = now.date_naive().and_time(NaiveTime::MIN).and_utc();

        let summary = sqlx::query_as::<_, MovementSummary>(
            r#"
            SELECT
                COUNT(*) AS total_movements,
                COALESCE(SUM(CASE WHEN movement_type = 'in' THEN quantity ELSE 0 END), 0) AS total_stock_in,
                COALESCE(SUM(CASE WHEN movement_type = 'out' THEN quantity ELSE 0 END), 0) AS total_stock_out,
                COALESCE(SUM(CASE WHEN created_at >= ?1 THEN 1 ELSE 0 END), 0) AS movements_today,
                COALESCE(SUM(CASE WHEN created_at >= ?2 THEN 1 ELSE 0 END), 0) AS movements_week,
                COALESCE(SUM(CASE WHEN created_at >= ?3 THEN 1 ELSE 0 END), 0) AS movements_month
            FROM stock_movements
            "#,
        )
        .bind(today)
        .bind(now - Duration::days(7))
        .bind(now - Duration::days(30))
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}

/// Appends one ledger row on the caller's connection.
pub(crate) async fn record_movement(conn: &mut SqliteConnection, movement: &StockMovement) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, product_id, movement_type, quantity, previous_stock, new_stock,
            reason, reference, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.product_id)
    .bind(movement.movement_type)
    .bind(movement.quantity)
    .bind(movement.previous_stock)
    .bind(movement.new_stock)
    .bind(&movement.reason)
    .bind(&movement.reference)
    .bind(movement.created_at)
    .execute(conn)
    .await?;
    Ok(())
}
