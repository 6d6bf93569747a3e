//! # Repositories
//!
//! One repository per aggregate. Each holds a clone of the pool and is
//! handed out by [`crate::Database`].
//!
//! ## Listing
//! ```text
//! XxxFilter (query string) ──► QueryBuilder: WHERE ... ──► COUNT(*)
//!                                              │
//!                                              └────────► ORDER BY / LIMIT / OFFSET
//!                                                               │
//!                                                               ▼
//!                                                         Page<T> { items, total, page, limit }
//! ```
//! The same `push_filters` runs for the count and the page so both see
//! identical predicates.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use stockroom_core::MAX_PAGE_LIMIT;

pub mod category;
pub mod dashboard;
pub mod media;
pub mod movement;
pub mod order;
pub mod product;
pub mod returns;
pub mod settings;
pub mod supplier;

pub use category::{CategoryFilter, CategoryRepository};
pub use dashboard::{DashboardRepository, DashboardStats};
pub use media::MediaRepository;
pub use movement::{MovementFilter, MovementRepository};
pub use order::{OrderFilter, OrderRepository, OrderStats};
pub use product::{ProductFilter, ProductRepository, ProductStats};
pub use returns::{ReturnFilter, ReturnRepository};
pub use settings::SettingsRepository;
pub use supplier::{SupplierFilter, SupplierRepository, SupplierSummary};

// =============================================================================
// Pagination
// =============================================================================

/// Page number and size after defaults and clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Rows per page, 1..=MAX_PAGE_LIMIT.
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        PageRequest {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

/// One page of a filtered listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    /// `ceil(total / limit)`.
    pub fn total_pages(&self) -> i64 {
        let limit = self.limit.max(1) as i64;
        (self.total + limit - 1) / limit
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

// =============================================================================
// Query Helpers
// =============================================================================

/// `%term%` for a LIKE search, or `None` for a blank term.
pub(crate) fn like_pattern(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("%{t}%"))
}

/// True for `asc` (any case); everything else sorts descending.
pub(crate) fn is_ascending(order: Option<&str>, default_asc: bool) -> bool {
    match order {
        Some(o) => o.eq_ignore_ascii_case("asc"),
        None => default_asc,
    }
}

/// Parses a date filter bound.
///
/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates. A plain date
/// used as an upper bound means "through the end of that day", so it maps
/// to midnight of the following day and callers compare with `<`.
pub(crate) fn parse_date_bound(value: Option<&str>, upper: bool) -> Option<DateTime<Utc>> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let date = if upper { date.succ_opt()? } else { date };
    Some(date.and_time(NaiveTime::MIN).and_utc())
}

/// Splits `a,b,c` into trimmed values, dropping blanks and `all`.
pub(crate) fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let req = PageRequest::new(Some(0), Some(500), 20);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, MAX_PAGE_LIMIT);

        let req = PageRequest::new(Some(3), None, 20);
        assert_eq!(req.limit, 20);
        assert_eq!(req.offset(), 40);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page: Page<()> = Page { items: vec![], total: 21, page: 1, limit: 10 };
        assert_eq!(page.total_pages(), 3);
        let page: Page<()> = Page { items: vec![], total: 0, page: 1, limit: 10 };
        assert_eq!(page.total_pages(), 0);
    }

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern(Some(" mug ")).as_deref(), Some("%mug%"));
        assert_eq!(like_pattern(Some("  ")), None);
        assert_eq!(like_pattern(None), None);
    }

    #[test]
    fn test_parse_date_bound() {
        let from = parse_date_bound(Some("2024-01-31"), false).unwrap();
        assert_eq!(from.to_rfc3339(), "2024-01-31T00:00:00+00:00");

        let to = parse_date_bound(Some("2024-01-31"), true).unwrap();
        assert_eq!(to.to_rfc3339(), "2024-02-01T00:00:00+00:00");

        assert!(parse_date_bound(Some("2024-01-31T10:00:00Z"), true).is_some());
        assert!(parse_date_bound(Some("yesterday"), false).is_none());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(Some("pending, shipped,,all")), vec!["pending", "shipped"]);
        assert!(split_list(None).is_empty());
    }
}
