//! # Order Repository
//!
//! Orders with their line items and fulfillment history.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/orders                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CreateOrderRequest::validate() ──► ValidatedOrder (sanitized)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  orders().create(validated)                                            │
//! │    BEGIN                                                                │
//! │      SELECT product per line ──► missing → 400 "Product not found"     │
//! │      OrderTotals::compute(lines, shipping, discount)                   │
//! │      INSERT orders (pending / pending)                                 │
//! │      INSERT order_items × N                                            │
//! │    COMMIT                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Side Effects
//! In the same transaction as the status change:
//! - `shipped` writes an `order_fulfillments` row (carrier fields may be null)
//! - `shipped`, `delivered` and `cancelled` are copied onto every line item

use std::collections::HashMap;

use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use stockroom_core::money::Money;
use stockroom_core::order::{generate_order_number, OrderPatch, PricedLine, ShipmentInfo, ValidatedOrder};
use stockroom_core::{
    CoreError, Fulfillment, Order, OrderItem, OrderStatus, OrderTotals, PaymentStatus, Product,
    ValidationError,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::{like_pattern, parse_date_bound, split_list, Page, PageRequest};
use crate::error::{DbError, DbResult};

/// Default page size for order listings.
pub const DEFAULT_ORDER_LIMIT: u32 = 10;

/// Query-string filters for `GET /api/orders`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderFilter {
    /// Comma-separated statuses; `all` is ignored.
    pub status: Option<String>,
    /// Comma-separated payment statuses; `all` is ignored.
    pub payment_status: Option<String>,
    pub customer_id: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    pub date_from: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD` (inclusive of the whole day).
    pub date_to: Option<String>,
    /// Lower bound on the order total, cents.
    pub min_amount: Option<i64>,
    /// Upper bound on the order total, cents.
    pub max_amount: Option<i64>,
    /// Substring of order number, customer id, name or email.
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl OrderFilter {
    fn push_filters(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1 = 1");

        push_in_list(qb, "status", split_list(self.status.as_deref()));
        push_in_list(qb, "payment_status", split_list(self.payment_status.as_deref()));

        if let Some(customer) = self.customer_id.as_deref().filter(|c| !c.is_empty()) {
            qb.push(" AND customer_id = ").push_bind(customer.to_string());
        }
        if let Some(from) = parse_date_bound(self.date_from.as_deref(), false) {
            qb.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = parse_date_bound(self.date_to.as_deref(), true) {
            qb.push(" AND created_at < ").push_bind(to);
        }
        if let Some(min) = self.min_amount {
            qb.push(" AND total_cents >= ").push_bind(min);
        }
        if let Some(max) = self.max_amount {
            qb.push(" AND total_cents <= ").push_bind(max);
        }
        if let Some(pattern) = like_pattern(self.search.as_deref()) {
            qb.push(" AND (order_number LIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_id LIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_email LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

fn push_in_list(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, values: Vec<String>) {
    if values.is_empty() {
        return;
    }
    qb.push(format!(" AND {column} IN ("));
    let mut separated = qb.separated(", ");
    for value in values {
        separated.push_bind(value);
    }
    separated.push_unseparated(")");
}

/// Order headline numbers for `GET /api/orders/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct OrderStats {
    pub total_orders: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub processing: i64,
    pub packed: i64,
    pub shipped: i64,
    pub delivered: i64,
    pub cancelled: i64,
    pub returned: i64,
    pub refunded: i64,
    /// Σ total over orders that were not cancelled.
    pub total_revenue_cents: i64,
    pub average_order_value_cents: i64,
    pub today_orders: i64,
    pub today_revenue_cents: i64,
}

/// Repository for orders, items and fulfillments.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Filtered page of orders, newest first, items included.
    pub async fn list(&self, filter: &OrderFilter) -> DbResult<Page<Order>> {
        let page = PageRequest::new(filter.page, filter.limit, DEFAULT_ORDER_LIMIT);
        debug!(?filter, page = page.page, limit = page.limit, "Listing orders");

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM orders");
        filter.push_filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM orders");
        filter.push_filters(&mut query);
        query
            .push(" ORDER BY created_at DESC, order_number DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let mut items = query.build_query_as::<Order>().fetch_all(&self.pool).await?;
        self.attach_items(&mut items).await?;

        Ok(Page {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    /// Loads the line items of every order in one query.
    async fn attach_items(&self, orders: &mut [Order]) -> DbResult<()> {
        if orders.is_empty() {
            return Ok(());
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM order_items WHERE order_id IN (");
        let mut separated = query.separated(", ");
        for order in orders.iter() {
            separated.push_bind(order.id.clone());
        }
        separated.push_unseparated(") ORDER BY created_at ASC, id ASC");

        let rows = query.build_query_as::<OrderItem>().fetch_all(&self.pool).await?;
        let mut by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for item in rows {
            by_order.entry(item.order_id.clone()).or_default().push(item);
        }
        for order in orders.iter_mut() {
            order.items = by_order.remove(&order.id).unwrap_or_default();
        }
        Ok(())
    }

    /// Gets an order with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Order> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        let mut orders = [order];
        self.attach_items(&mut orders).await?;
        let [order] = orders;
        Ok(order)
    }

    pub async fn by_status(&self, status: OrderStatus) -> DbResult<Vec<Order>> {
        let mut orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE status = ? ORDER BY created_at DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        self.attach_items(&mut orders).await?;
        Ok(orders)
    }

    pub async fn by_customer_email(&self, email: &str) -> DbResult<Vec<Order>> {
        let mut orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE customer_email = ? COLLATE NOCASE ORDER BY created_at DESC",
        )
        .bind(email.trim())
        .fetch_all(&self.pool)
        .await?;
        self.attach_items(&mut orders).await?;
        Ok(orders)
    }

    /// Prices and stores a validated order.
    ///
    /// ## Errors
    /// - `Validation` when a line names a product that doesn't exist
    pub async fn create(&self, request: ValidatedOrder) -> DbResult<Order> {
        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        let mut priced = Vec::with_capacity(request.lines.len());
        let mut items = Vec::with_capacity(request.lines.len());
        let out_of_range = || CoreError::Validation(ValidationError::Rule("Order total is out of range".into()));
        for line in &request.lines {
            let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
                .bind(&line.product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    CoreError::Validation(ValidationError::Rule(format!(
                        "Product not found: {}",
                        line.product_id
                    )))
                })?;

            let unit_price = Money::from_cents(line.unit_price_cents);
            let line_total = unit_price
                .multiply_quantity(line.quantity)
                .ok_or_else(out_of_range)?;
            priced.push(PricedLine {
                unit_price,
                quantity: line.quantity,
                tax_rate: product.tax_rate(),
            });
            items.push(OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: product.id,
                product_name: product.name,
                sku: product.sku,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                total_price_cents: line_total.cents(),
                status: OrderStatus::Pending,
                created_at: now,
            });
        }

        let totals = OrderTotals::compute(
            &priced,
            Money::from_cents(request.shipping_cents),
            Money::from_cents(request.discount_cents),
        )
        .map_err(CoreError::from)?;

        let order = Order {
            id: order_id,
            order_number: generate_order_number(now),
            customer_id: request.customer_id,
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: request.payment_method,
            currency: request.currency,
            subtotal_cents: totals.subtotal_cents,
            tax_cents: totals.tax_cents,
            shipping_cents: totals.shipping_cents,
            discount_cents: totals.discount_cents,
            total_cents: totals.total_cents,
            shipping_address: request.shipping_address,
            billing_address: request.billing_address,
            notes: request.notes,
            tracking_number: None,
            shipping_carrier: None,
            tracking_url: None,
            shipped_at: None,
            delivered_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
            items,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, customer_id, customer_name, customer_email,
                status, payment_status, payment_method, currency,
                subtotal_cents, tax_cents, shipping_cents, discount_cents, total_cents,
                shipping_address, billing_address, notes, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.customer_id)
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(order.payment_method)
        .bind(&order.currency)
        .bind(order.subtotal_cents)
        .bind(order.tax_cents)
        .bind(order.shipping_cents)
        .bind(order.discount_cents)
        .bind(order.total_cents)
        .bind(sqlx::types::Json(&order.shipping_address))
        .bind(sqlx::types::Json(&order.billing_address))
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, product_name, sku, quantity,
                    unit_price_cents, total_price_cents, status, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(&item.sku)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.total_price_cents)
            .bind(item.status)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            id = %order.id,
            order_number = %order.order_number,
            items = order.items.len(),
            total_cents = order.total_cents,
            "Order created"
        );
        Ok(order)
    }

    /// Sparse update of status, payment status, contact and tracking fields.
    pub async fn update_with(&self, id: &str, patch: OrderPatch) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;
        let mut order = fetch_order(&mut tx, id).await?;

        let status_changed = patch.status.is_some();
        order.apply(patch, Utc::now());
        write_order(&mut tx, &order).await?;
        if status_changed {
            sync_item_status(&mut tx, id, order.status).await?;
        }

        tx.commit().await?;

        debug!(id = %id, status = %order.status, "Order updated");
        self.get_by_id(id).await
    }

    /// Moves an order to `status`, applying carrier details when given.
    ///
    /// Every move to `shipped` records a fulfillment, with or without
    /// carrier details.
    pub async fn fulfill(
        &self,
        id: &str,
        status: OrderStatus,
        shipment: Option<ShipmentInfo>,
    ) -> DbResult<Order> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut order = fetch_order(&mut tx, id).await?;

        order.stamp_status(status, now);
        if let Some(info) = &shipment {
            if info.carrier.is_some() {
                order.shipping_carrier = info.carrier.clone();
            }
            if info.tracking_number.is_some() {
                order.tracking_number = info.tracking_number.clone();
            }
            if info.tracking_url.is_some() {
                order.tracking_url = info.tracking_url.clone();
            }
        }
        write_order(&mut tx, &order).await?;

        if status == OrderStatus::Shipped {
            sqlx::query(
                r#"
                INSERT INTO order_fulfillments (
                    id, order_id, fulfillment_status, tracking_number,
                    shipping_carrier, tracking_url, shipped_at, notes, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(id)
            .bind(OrderStatus::Shipped)
            .bind(&order.tracking_number)
            .bind(&order.shipping_carrier)
            .bind(&order.tracking_url)
            .bind(now)
            .bind(shipment.and_then(|info| info.notes))
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        sync_item_status(&mut tx, id, status).await?;

        tx.commit().await?;

        info!(id = %id, status = %status, "Order fulfillment updated");
        self.get_by_id(id).await
    }

    /// Sets the status with no carrier details (bulk actions).
    pub async fn set_status(&self, id: &str, status: OrderStatus) -> DbResult<Order> {
        self.fulfill(id, status, None).await
    }

    /// Fulfillment history, newest first. 404 when the order is missing.
    pub async fn fulfillments(&self, id: &str) -> DbResult<Vec<Fulfillment>> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Order", id));
        }

        let records = sqlx::query_as::<_, Fulfillment>(
            "SELECT * FROM order_fulfillments WHERE order_id = ? ORDER BY created_at DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Deletes an order; items and fulfillments cascade.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        info!(id = %id, "Order deleted");
        Ok(())
    }

    pub async fn stats(&self) -> DbResult<OrderStats> {
        let today = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();

        let stats = sqlx::query_as::<_, OrderStats>(
            r#"
            SELECT
                COUNT(*) AS total_orders,
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending,
                COALESCE(SUM(CASE WHEN status = 'confirmed' THEN 1 ELSE 0 END), 0) AS confirmed,
                COALESCE(SUM(CASE WHEN status = 'processing' THEN 1 ELSE 0 END), 0) AS processing,
                COALESCE(SUM(CASE WHEN status = 'packed' THEN 1 ELSE 0 END), 0) AS packed,
                COALESCE(SUM(CASE WHEN status = 'shipped' THEN 1 ELSE 0 END), 0) AS shipped,
                COALESCE(SUM(CASE WHEN status = 'delivered' THEN 1 ELSE 0 END), 0) AS delivered,
                COALESCE(SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END), 0) AS cancelled,
                COALESCE(SUM(CASE WHEN status = 'returned' THEN 1 ELSE 0 END), 0) AS returned,
                COALESCE(SUM(CASE WHEN status = 'refunded' THEN 1 ELSE 0 END), 0) AS refunded,
                COALESCE(SUM(CASE WHEN status != 'cancelled' THEN total_cents ELSE 0 END), 0)
                    AS total_revenue_cents,
                CAST(COALESCE(AVG(CASE WHEN status != 'cancelled' THEN total_cents END), 0) AS INTEGER)
                    AS average_order_value_cents,
                COALESCE(SUM(CASE WHEN created_at >= ?1 THEN 1 ELSE 0 END), 0) AS today_orders,
                COALESCE(SUM(CASE WHEN created_at >= ?1 AND status != 'cancelled'
                                  THEN total_cents ELSE 0 END), 0) AS today_revenue_cents
            FROM orders
            "#,
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}

async fn fetch_order(conn: &mut SqliteConnection, id: &str) -> DbResult<Order> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| DbError::not_found("Order", id))
}

/// Copies shipped, delivered and cancelled onto the order's items.
async fn sync_item_status(conn: &mut SqliteConnection, order_id: &str, status: OrderStatus) -> DbResult<()> {
    if !matches!(
        status,
        OrderStatus::Shipped | OrderStatus::Delivered | OrderStatus::Cancelled
    ) {
        return Ok(());
    }
    sqlx::query("UPDATE order_items SET status = ? WHERE order_id = ?")
        .bind(status)
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Writes the mutable columns of an order row.
async fn write_order(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE orders SET
            customer_name = ?, customer_email = ?, status = ?, payment_status = ?,
            shipping_address = ?, billing_address = ?, notes = ?,
            tracking_number = ?, shipping_carrier = ?, tracking_url = ?,
            shipped_at = ?, delivered_at = ?, cancelled_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&order.customer_name)
    .bind(&order.customer_email)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(sqlx::types::Json(&order.shipping_address))
    .bind(sqlx::types::Json(&order.billing_address))
    .bind(&order.notes)
    .bind(&order.tracking_number)
    .bind(&order.shipping_carrier)
    .bind(&order.tracking_url)
    .bind(order.shipped_at)
    .bind(order.delivered_at)
    .bind(order.cancelled_at)
    .bind(order.updated_at)
    .bind(&order.id)
    .execute(conn)
    .await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
