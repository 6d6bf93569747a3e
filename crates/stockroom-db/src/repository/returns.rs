//! # Return Repository
//!
//! Customer returns, their lines, and refunds.
//!
//! ## Side Effects
//! ```text
//! create  : order must be shipped/delivered/returned; each line must name
//!           a product on the order, at most the ordered quantity
//! approve : order.status = returned                  (same transaction)
//! refund  : order.payment_status = refunded | partially_refunded
//! ```

use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use stockroom_core::returns::{
    generate_return_number, RefundRequest, ReturnPatch, ValidatedReturn, RETURNABLE,
};
use stockroom_core::{
    CoreError, Order, OrderItem, OrderReturn, OrderStatus, PaymentStatus, ReturnItem, ReturnStatus,
    ValidationError,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Query-string filters for `GET /api/orders/returns`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReturnFilter {
    pub status: Option<ReturnStatus>,
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReturnRepository {
    pool: SqlitePool,
}

impl ReturnRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReturnRepository { pool }
    }

    /// Newest first, lines included.
    pub async fn list(&self, filter: &ReturnFilter) -> DbResult<Vec<OrderReturn>> {
        debug!(?filter, "Listing returns");

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM order_returns WHERE 1 = 1");
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(customer) = filter.customer_id.as_deref().filter(|c| !c.is_empty()) {
            query.push(" AND customer_id = ").push_bind(customer.to_string());
        }
        query.push(" ORDER BY created_at DESC, return_number DESC");

        let mut returns = query.build_query_as::<OrderReturn>().fetch_all(&self.pool).await?;
        self.attach_items(&mut returns).await?;
        Ok(returns)
    }

    async fn attach_items(&self, returns: &mut [OrderReturn]) -> DbResult<()> {
        if returns.is_empty() {
            return Ok(());
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM return_items WHERE return_id IN (");
        let mut separated = query.separated(", ");
        for ret in returns.iter() {
            separated.push_bind(ret.id.clone());
        }
        separated.push_unseparated(") ORDER BY product_name ASC, id ASC");

        let rows = query.build_query_as::<ReturnItem>().fetch_all(&self.pool).await?;
        let mut by_return: HashMap<String, Vec<ReturnItem>> = HashMap::new();
        for item in rows {
            by_return.entry(item.return_id.clone()).or_default().push(item);
        }
        for ret in returns.iter_mut() {
            ret.items = by_return.remove(&ret.id).unwrap_or_default();
        }
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<OrderReturn> {
        let ret = sqlx::query_as::<_, OrderReturn>("SELECT * FROM order_returns WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Return", id))?;

        let mut returns = [ret];
        self.attach_items(&mut returns).await?;
        let [ret] = returns;
        Ok(ret)
    }

    /// Opens a pending return against an order.
    ///
    /// ## Errors
    /// - `NotFound` when the order doesn't exist
    /// - `InvalidStatus` when the order has not shipped
    /// - `Validation` when a line doesn't match the order's items
    pub async fn create(&self, request: ValidatedReturn) -> DbResult<OrderReturn> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(&request.order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Order", &request.order_id))?;
        if !RETURNABLE.contains(&order.status) {
            return Err(CoreError::invalid_status("order", order.status, "return").into());
        }

        let ordered = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = ?")
            .bind(&order.id)
            .fetch_all(&mut *tx)
            .await?;

        let return_id = Uuid::new_v4().to_string();
        let mut problems = Vec::new();
        let mut items = Vec::with_capacity(request.lines.len());
        for (index, line) in request.lines.iter().enumerate() {
            let n = index + 1;
            match ordered.iter().find(|item| item.product_id == line.product_id) {
                None => problems.push(format!("Item {n}: Product {} is not on this order", line.product_id)),
                Some(item) if line.quantity > item.quantity => {
                    problems.push(format!("Item {n}: Quantity exceeds the {} ordered", item.quantity))
                }
                Some(item) => items.push(ReturnItem {
                    id: Uuid::new_v4().to_string(),
                    return_id: return_id.clone(),
                    order_item_id: Some(item.id.clone()),
                    product_id: item.product_id.clone(),
                    product_name: item.product_name.clone(),
                    quantity: line.quantity,
                    refund_cents: line.refund_cents,
                }),
            }
        }
        if !problems.is_empty() {
            return Err(CoreError::from(ValidationError::Many(problems)).into());
        }
        let total_refund_cents = request.total_refund_cents().ok_or_else(|| {
            CoreError::from(ValidationError::Rule("Refund total is out of range".into()))
        })?;

        let ret = OrderReturn {
            id: return_id,
            return_number: generate_return_number(now),
            order_id: order.id,
            customer_id: order.customer_id,
            status: ReturnStatus::Pending,
            reason: request.reason,
            description: request.description,
            notes: None,
            total_refund_cents,
            refunded_cents: None,
            refund_method: None,
            refund_transaction_id: None,
            approved_at: None,
            rejected_at: None,
            received_at: None,
            refunded_at: None,
            created_at: now,
            updated_at: now,
            items,
        };

        sqlx::query(
            r#"
            INSERT INTO order_returns (
                id, return_number, order_id, customer_id, status, reason, description,
                total_refund_cents, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&ret.id)
        .bind(&ret.return_number)
        .bind(&ret.order_id)
        .bind(&ret.customer_id)
        .bind(ret.status)
        .bind(&ret.reason)
        .bind(&ret.description)
        .bind(ret.total_refund_cents)
        .bind(ret.created_at)
        .bind(ret.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &ret.items {
            sqlx::query(
                r#"
                INSERT INTO return_items (
                    id, return_id, order_item_id, product_id, product_name, quantity, refund_cents
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.id)
            .bind(&item.return_id)
            .bind(&item.order_item_id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.refund_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            id = %ret.id,
            return_number = %ret.return_number,
            order_id = %ret.order_id,
            total_refund_cents = ret.total_refund_cents,
            "Return created"
        );
        Ok(ret)
    }

    /// Status and notes change. Approval marks the order returned.
    pub async fn update_with(&self, id: &str, patch: ReturnPatch) -> DbResult<OrderReturn> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut ret = fetch_return(&mut tx, id).await?;

        let approving = patch.status == Some(ReturnStatus::Approved);
        ret.apply(patch, now).map_err(CoreError::from)?;
        write_return(&mut tx, &ret).await?;

        if approving {
            sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
                .bind(OrderStatus::Returned)
                .bind(now)
                .bind(&ret.order_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(id = %id, status = %ret.status, "Return updated");
        self.get_by_id(id).await
    }

    /// Deletes a return that is still pending; its lines cascade.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        let ret = fetch_return(&mut tx, id).await?;
        if ret.status != ReturnStatus::Pending {
            return Err(CoreError::invalid_status("return", ret.status, "delete").into());
        }

        sqlx::query("DELETE FROM order_returns WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(id = %id, "Return deleted");
        Ok(())
    }

    /// Refunds an approved return and updates the order's payment status.
    ///
    /// ## Errors
    /// - `NotFound` when the return doesn't exist
    /// - `InvalidStatus` unless the return is approved
    /// - `Validation` for a missing method or an amount outside
    ///   `1..=total_refund_cents`
    pub async fn refund(&self, id: &str, request: RefundRequest) -> DbResult<OrderReturn> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut ret = fetch_return(&mut tx, id).await?;
        if ret.status != ReturnStatus::Approved {
            return Err(CoreError::invalid_status("return", ret.status, "refund").into());
        }

        let refund = request
            .validate(ret.total_refund_cents)
            .map_err(CoreError::from)?;
        ret.refunded_cents = Some(refund.amount_cents);
        ret.refund_method = Some(refund.method);
        ret.refund_transaction_id = Some(refund.transaction_id);
        ret.stamp_status(ReturnStatus::Refunded, now);
        write_return(&mut tx, &ret).await?;

        let order_total: i64 = sqlx::query_scalar("SELECT total_cents FROM orders WHERE id = ?")
            .bind(&ret.order_id)
            .fetch_one(&mut *tx)
            .await?;
        let payment_status = if refund.amount_cents >= order_total {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::PartiallyRefunded
        };
        sqlx::query("UPDATE orders SET payment_status = ?, updated_at = ? WHERE id = ?")
            .bind(payment_status)
            .bind(now)
            .bind(&ret.order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            id = %id,
            amount_cents = refund.amount_cents,
            payment_status = %payment_status,
            "Return refunded"
        );
        self.get_by_id(id).await
    }
}

async fn fetch_return(conn: &mut SqliteConnection, id: &str) -> DbResult<OrderReturn> {
    sqlx::query_as::<_, OrderReturn>("SELECT * FROM order_returns WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| DbError::not_found("Return", id))
}

async fn write_return(conn: &mut SqliteConnection, ret: &OrderReturn) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE order_returns SET
            status = ?, notes = ?, refunded_cents = ?, refund_method = ?,
            refund_transaction_id = ?, approved_at = ?, rejected_at = ?,
            received_at = ?, refunded_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(ret.status)
    .bind(&ret.notes)
    .bind(ret.refunded_cents)
    .bind(&ret.refund_method)
    .bind(&ret.refund_transaction_id)
    .bind(ret.approved_at)
    .bind(ret.rejected_at)
    .bind(ret.received_at)
    .bind(ret.refunded_at)
    .bind(ret.updated_at)
    .bind(&ret.id)
    .execute(conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use stockroom_core::returns::ReturnLine;

    use super::*;
    use crate::repository::order::tests::validated;
    use crate::repository::product::tests::{seed_category, seed_product};
    use crate::{Database, DbConfig};

    /// Database with one shipped order of two mugs at 10.00.
    async fn setup() -> (Database, Order) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cat = seed_category(&db, "Kitchen").await;
        let product = seed_product(&db, "Mug", &cat).await;
        let order = db.orders().create(validated(&product.id, 2, 1000)).await.unwrap();
        let order = db.orders().set_status(&order.id, OrderStatus::Shipped).await.unwrap();
        (db, order)
    }

    fn request(order: &Order, quantity: i64, refund_cents: i64) -> ValidatedReturn {
        ValidatedReturn {
            order_id: order.id.clone(),
            lines: vec![ReturnLine {
                product_id: order.items[0].product_id.clone(),
                quantity,
                refund_cents,
            }],
            reason: "Chipped".into(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_copies_order_details() {
        let (db, order) = setup().await;
        let ret = db.returns().create(request(&order, 1, 1000)).await.unwrap();

        assert_eq!(ret.status, ReturnStatus::Pending);
        assert_eq!(ret.customer_id, "cust-1");
        assert_eq!(ret.total_refund_cents, 1000);
        assert!(ret.return_number.starts_with("RET-"));

        let fetched = db.returns().get_by_id(&ret.id).await.unwrap();
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.items[0].product_name, "Mug");
        assert_eq!(fetched.items[0].order_item_id.as_deref(), Some(order.items[0].id.as_str()));
    }

    #[tokio::test]
    async fn test_create_checks_order() {
        let (db, order) = setup().await;

        let mut missing = request(&order, 1, 100);
        missing.order_id = "ghost".into();
        assert!(db.returns().create(missing).await.unwrap_err().is_not_found());

        let err = db.returns().create(request(&order, 3, 100)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));

        let mut stranger = request(&order, 1, 100);
        stranger.lines[0].product_id = "other".into();
        assert!(db.returns().create(stranger).await.is_err());

        db.orders().set_status(&order.id, OrderStatus::Pending).await.unwrap();
        let err = db.returns().create(request(&order, 1, 100)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidStatus { .. })));
    }

    #[tokio::test]
    async fn test_approve_marks_order_returned_then_refund() {
        let (db, order) = setup().await;
        let ret = db.returns().create(request(&order, 1, 1000)).await.unwrap();

        let early = db
            .returns()
            .refund(&ret.id, RefundRequest { amount_cents: Some(500), method: Some("card".into()) })
            .await
            .unwrap_err();
        assert!(matches!(early, DbError::Core(CoreError::InvalidStatus { .. })));

        let approved = db
            .returns()
            .update_with(&ret.id, ReturnPatch { status: Some(ReturnStatus::Approved), notes: None })
            .await
            .unwrap();
        assert!(approved.approved_at.is_some());
        assert_eq!(db.orders().get_by_id(&order.id).await.unwrap().status, OrderStatus::Returned);

        let too_much = db
            .returns()
            .refund(&ret.id, RefundRequest { amount_cents: Some(5000), method: Some("card".into()) })
            .await;
        assert!(too_much.is_err());

        let refunded = db
            .returns()
            .refund(&ret.id, RefundRequest { amount_cents: Some(1000), method: Some("card".into()) })
            .await
            .unwrap();
        assert_eq!(refunded.status, ReturnStatus::Refunded);
        assert_eq!(refunded.refunded_cents, Some(1000));
        assert!(refunded.refund_transaction_id.unwrap().starts_with("REFUND-"));
        assert_eq!(
            db.orders().get_by_id(&order.id).await.unwrap().payment_status,
            PaymentStatus::PartiallyRefunded
        );
    }

    #[tokio::test]
    async fn test_delete_only_pending_and_filters() {
        let (db, order) = setup().await;
        let first = db.returns().create(request(&order, 1, 100)).await.unwrap();
        let second = db.returns().create(request(&order, 1, 100)).await.unwrap();
        db.returns()
            .update_with(&second.id, ReturnPatch { status: Some(ReturnStatus::Rejected), notes: None })
            .await
            .unwrap();

        let pending = db
            .returns()
            .list(&ReturnFilter { status: Some(ReturnStatus::Pending), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].items.len(), 1);

        let err = db.returns().delete(&second.id).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidStatus { .. })));

        db.returns().delete(&first.id).await.unwrap();
        assert!(db.returns().get_by_id(&first.id).await.unwrap_err().is_not_found());
        assert!(db.returns().delete("ghost").await.unwrap_err().is_not_found());
    }
}
