//! # Supplier Repository
//!
//! Supplier directory: filtered listing, a status/type summary, and CRUD
//! with unique supplier codes.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use stockroom_core::{CoreError, Supplier, SupplierStatus, SupplierType};
use tracing::{debug, info};

use super::{is_ascending, like_pattern, parse_date_bound, Page, PageRequest};
use crate::error::{DbError, DbResult};

/// Default page size for supplier listings.
pub const DEFAULT_SUPPLIER_LIMIT: u32 = 50;

/// How many recent suppliers the summary carries.
const RECENT_SUPPLIERS: i64 = 5;

/// Query-string filters for `GET /api/suppliers`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SupplierFilter {
    /// Substring of name, code or email.
    pub search: Option<String>,
    pub status: Option<SupplierStatus>,
    pub supplier_type: Option<SupplierType>,
    pub business_type: Option<String>,
    pub category: Option<String>,
    pub rating_min: Option<f64>,
    pub rating_max: Option<f64>,
    pub credit_limit_min: Option<i64>,
    pub credit_limit_max: Option<i64>,
    pub created_from: Option<String>,
    pub created_to: Option<String>,
    /// `name` (default), `created_at`, `rating` or `status`.
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl SupplierFilter {
    fn push_filters(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1 = 1");

        if let Some(pattern) = like_pattern(self.search.as_deref()) {
            qb.push(" AND (name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR code LIKE ")
                .push_bind(pattern.clone())
                .push(" OR email LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(supplier_type) = self.supplier_type {
            qb.push(" AND supplier_type = ").push_bind(supplier_type);
        }
        if let Some(business_type) = self.business_type.as_deref().filter(|b| !b.is_empty()) {
            qb.push(" AND business_type = ").push_bind(business_type.to_string());
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            qb.push(" AND category = ").push_bind(category.to_string());
        }
        if let Some(min) = self.rating_min {
            qb.push(" AND rating >= ").push_bind(min);
        }
        if let Some(max) = self.rating_max {
            qb.push(" AND rating <= ").push_bind(max);
        }
        if let Some(min) = self.credit_limit_min {
            qb.push(" AND credit_limit_cents >= ").push_bind(min);
        }
        if let Some(max) = self.credit_limit_max {
            qb.push(" AND credit_limit_cents <= ").push_bind(max);
        }
        if let Some(from) = parse_date_bound(self.created_from.as_deref(), false) {
            qb.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = parse_date_bound(self.created_to.as_deref(), true) {
            qb.push(" AND created_at < ").push_bind(to);
        }
    }

    fn order_clause(&self) -> String {
        let column = match self.sort_by.as_deref() {
            Some("created_at") => "created_at",
            Some("rating") => "rating",
            Some("status") => "status",
            Some("name") => "name",
            // Unrecognized columns fall back to name ascending.
            _ => return " ORDER BY name ASC".to_string(),
        };
        let direction = if is_ascending(self.sort_order.as_deref(), true) {
            "ASC"
        } else {
            "DESC"
        };
        format!(" ORDER BY {column} {direction}, name ASC")
    }
}

/// Counts per supplier status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct StatusCounts {
    pub active: i64,
    pub inactive: i64,
    pub suspended: i64,
    pub pending: i64,
}

/// Share of suppliers of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeShare {
    pub supplier_type: SupplierType,
    pub count: i64,
    /// Whole-number percentage of all suppliers.
    pub percentage: i64,
}

/// Body of `GET /api/suppliers/summary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierSummary {
    pub total: i64,
    pub by_status: StatusCounts,
    pub by_type: Vec<TypeShare>,
    /// Most recent suppliers created in the last 30 days.
    pub recent: Vec<Supplier>,
}

/// Rounds `count / total` to a whole percentage; 0 when `total` is 0.
fn percentage(count: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as i64
}

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn list(&self, filter: &SupplierFilter) -> DbResult<Page<Supplier>> {
        let page = PageRequest::new(filter.page, filter.limit, DEFAULT_SUPPLIER_LIMIT);
        debug!(?filter, page = page.page, limit = page.limit, "Listing suppliers");

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM suppliers");
        filter.push_filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM suppliers");
        filter.push_filters(&mut query);
        query
            .push(filter.order_clause())
            .push(" LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = query.build_query_as::<Supplier>().fetch_all(&self.pool).await?;

        Ok(Page {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    /// Counts by status and type plus the latest additions.
    pub async fn summary(&self) -> DbResult<SupplierSummary> {
        let by_status = sqlx::query_as::<_, StatusCounts>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status = 'active' THEN 1 ELSE 0 END), 0) AS active,
                COALESCE(SUM(CASE WHEN status = 'inactive' THEN 1 ELSE 0 END), 0) AS inactive,
                COALESCE(SUM(CASE WHEN status = 'suspended' THEN 1 ELSE 0 END), 0) AS suspended,
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending
            FROM suppliers
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let type_counts: Vec<(SupplierType, i64)> = sqlx::query_as(
            "SELECT supplier_type, COUNT(*) FROM suppliers GROUP BY supplier_type",
        )
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = type_counts.iter().map(|(_, count)| count).sum();
        let by_type = SupplierType::ALL
            .iter()
            .map(|supplier_type| {
                let count = type_counts
                    .iter()
                    .find(|(t, _)| t == supplier_type)
                    .map_or(0, |(_, c)| *c);
                TypeShare {
                    supplier_type: *supplier_type,
                    count,
                    percentage: percentage(count, total),
                }
            })
            .collect();

        let recent = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE created_at >= ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(Utc::now() - Duration::days(30))
        .bind(RECENT_SUPPLIERS)
        .fetch_all(&self.pool)
        .await?;

        Ok(SupplierSummary {
            total,
            by_status,
            by_type,
            recent,
        })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Supplier> {
        sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// True when a supplier other than `exclude_id` owns `code`.
    pub async fn code_taken(&self, code: &str, exclude_id: Option<&str>) -> DbResult<bool> {
        let found: Option<String> = sqlx::query_scalar("SELECT id FROM suppliers WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some_and(|id| Some(id.as_str()) != exclude_id))
    }

    async fn check_code(&self, supplier: &Supplier, exclude_id: Option<&str>) -> DbResult<()> {
        if let Some(code) = &supplier.code {
            if self.code_taken(code, exclude_id).await? {
                return Err(CoreError::SupplierCodeConflict(code.clone()).into());
            }
        }
        Ok(())
    }

    pub async fn create(&self, supplier: &Supplier) -> DbResult<()> {
        self.check_code(supplier, None).await?;

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, name, code, email, phone, website,
                address_line_1, address_line_2, city, state, postal_code, country,
                tax_id, business_registration, business_type,
                primary_contact_name, primary_contact_email, primary_contact_phone,
                payment_terms, credit_limit_cents, currency, rating,
                lead_time_days, minimum_order_cents,
                status, supplier_type, category, notes, internal_notes,
                created_by, created_at, updated_at
            ) VALUES (
                ?, ?, ?, ?, ?, ?,
                ?, ?, ?, ?, ?, ?,
                ?, ?, ?,
                ?, ?, ?,
                ?, ?, ?, ?,
                ?, ?,
                ?, ?, ?, ?, ?,
                ?, ?, ?
            )
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.code)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.website)
        .bind(&supplier.address_line_1)
        .bind(&supplier.address_line_2)
        .bind(&supplier.city)
        .bind(&supplier.state)
        .bind(&supplier.postal_code)
        .bind(&supplier.country)
        .bind(&supplier.tax_id)
        .bind(&supplier.business_registration)
        .bind(&supplier.business_type)
        .bind(&supplier.primary_contact_name)
        .bind(&supplier.primary_contact_email)
        .bind(&supplier.primary_contact_phone)
        .bind(&supplier.payment_terms)
        .bind(supplier.credit_limit_cents)
        .bind(&supplier.currency)
        .bind(supplier.rating)
        .bind(supplier.lead_time_days)
        .bind(supplier.minimum_order_cents)
        .bind(supplier.status)
        .bind(supplier.supplier_type)
        .bind(&supplier.category)
        .bind(&supplier.notes)
        .bind(&supplier.internal_notes)
        .bind(&supplier.created_by)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %supplier.id, name = %supplier.name, "Supplier created");
        Ok(())
    }

    pub async fn update(&self, supplier: &Supplier) -> DbResult<()> {
        self.check_code(supplier, Some(&supplier.id)).await?;

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?, code = ?, email = ?, phone = ?, website = ?,
                address_line_1 = ?, address_line_2 = ?, city = ?, state = ?,
                postal_code = ?, country = ?,
                tax_id = ?, business_registration = ?, business_type = ?,
                primary_contact_name = ?, primary_contact_email = ?, primary_contact_phone = ?,
                payment_terms = ?, credit_limit_cents = ?, currency = ?, rating = ?,
                lead_time_days = ?, minimum_order_cents = ?,
                status = ?, supplier_type = ?, category = ?, notes = ?, internal_notes = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.code)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.website)
        .bind(&supplier.address_line_1)
        .bind(&supplier.address_line_2)
        .bind(&supplier.city)
        .bind(&supplier.state)
        .bind(&supplier.postal_code)
        .bind(&supplier.country)
        .bind(&supplier.tax_id)
        .bind(&supplier.business_registration)
        .bind(&supplier.business_type)
        .bind(&supplier.primary_contact_name)
        .bind(&supplier.primary_contact_email)
        .bind(&supplier.primary_contact_phone)
        .bind(&supplier.payment_terms)
        .bind(supplier.credit_limit_cents)
        .bind(&supplier.currency)
        .bind(supplier.rating)
        .bind(supplier.lead_time_days)
        .bind(supplier.minimum_order_cents)
        .bind(supplier.status)
        .bind(supplier.supplier_type)
        .bind(&supplier.category)
        .bind(&supplier.notes)
        .bind(&supplier.internal_notes)
        .bind(supplier.updated_at)
        .bind(&supplier.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", &supplier.id));
        }

        debug!(id = %supplier.id, "Supplier updated");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        info!(id = %id, "Supplier deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use stockroom_core::input::SupplierInput;

    use super::*;
    use crate::{Database, DbConfig};

    fn supplier(name: &str, code: Option<&str>) -> Supplier {
        Supplier::create(
            SupplierInput {
                name: Some(name.into()),
                email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
                code: code.map(String::from),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_code_is_conflict() {
        let db = setup().await;
        db.suppliers().create(&supplier("Acme", Some("ACM-01"))).await.unwrap();

        let err = db
            .suppliers()
            .create(&supplier("Globex", Some("ACM-01")))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::SupplierCodeConflict(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_own_code_and_rejects_others() {
        let db = setup().await;
        let mut acme = supplier("Acme", Some("ACM-01"));
        db.suppliers().create(&acme).await.unwrap();
        db.suppliers().create(&supplier("Globex", Some("GLX-01"))).await.unwrap();

        acme.rating = Some(4.5);
        db.suppliers().update(&acme).await.unwrap();
        assert_eq!(db.suppliers().get_by_id(&acme.id).await.unwrap().rating, Some(4.5));

        acme.code = Some("GLX-01".into());
        assert!(db.suppliers().update(&acme).await.is_err());
    }

    #[tokio::test]
    async fn test_list_filters_and_unknown_sort() {
        let db = setup().await;
        let mut zeta = supplier("Zeta", None);
        zeta.status = SupplierStatus::Suspended;
        db.suppliers().create(&zeta).await.unwrap();
        db.suppliers().create(&supplier("Alpha", None)).await.unwrap();

        let sorted = db
            .suppliers()
            .list(&SupplierFilter {
                sort_by: Some("bogus".into()),
                sort_order: Some("desc".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(sorted.items[0].name, "Alpha");

        let suspended = db
            .suppliers()
            .list(&SupplierFilter {
                status: Some(SupplierStatus::Suspended),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(suspended.total, 1);
        assert_eq!(suspended.items[0].name, "Zeta");
    }

    #[tokio::test]
    async fn test_summary_percentages() {
        let db = setup().await;
        let mut distributor = supplier("Dist", None);
        distributor.supplier_type = SupplierType::Distributor;
        db.suppliers().create(&distributor).await.unwrap();
        db.suppliers().create(&supplier("Maker One", None)).await.unwrap();
        db.suppliers().create(&supplier("Maker Two", None)).await.unwrap();

        let summary = db.suppliers().summary().await.unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_status.active, 3);

        let share = |t: SupplierType| summary.by_type.iter().find(|s| s.supplier_type == t).unwrap().percentage;
        assert_eq!(share(SupplierType::Manufacturer), 67);
        assert_eq!(share(SupplierType::Distributor), 33);
        assert_eq!(share(SupplierType::Retailer), 0);
        assert_eq!(summary.recent.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let db = setup().await;
        assert!(db.suppliers().delete("missing").await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 0), 0);
    }
}
