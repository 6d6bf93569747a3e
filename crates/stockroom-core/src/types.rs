//! # Domain Types
//!
//! Entities and status enums shared by the database layer and the API.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────┐  1   * ┌──────────────┐  1   * ┌──────────────┐      │
//! │  │   Category   │◄───────│   Product    │───────►│    Media     │      │
//! │  │  slug unique │        │ slug, sku    │        │ is_primary   │      │
//! │  └──────────────┘        └──────────────┘        └──────────────┘      │
//! │                                                                         │
//! │  ┌──────────────┐  1   * ┌──────────────┐                              │
//! │  │    Order     │───────►│  OrderItem   │                              │
//! │  │ ORD-YYYYMMDD │───────►│ Fulfillment  │                              │
//! │  └──────────────┘        └──────────────┘                              │
//! │                                                                         │
//! │  ┌──────────────┐        ┌──────────────────────────────┐              │
//! │  │   Supplier   │        │ CompanySettings / Invoice... │ (settings)   │
//! │  │  code unique │        └──────────────────────────────┘              │
//! │  └──────────────┘                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Money columns end in `_cents`, rates in `_bps`. JSON columns (addresses,
//! galleries, attributes) decode through `sqlx(json)` when the `sqlx`
//! feature is on.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, TaxRate};

// =============================================================================
// String Enums
// =============================================================================

/// Implements `as_str`, `ALL`, `Display` and `FromStr` for a unit enum
/// whose wire form is also its column value.
macro_rules! string_enum {
    ($ty:ident, $field:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// The stored / wire representation.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    _ => Err(ValidationError::NotAllowed {
                        field: $field.to_string(),
                        allowed: $ty::ALL.iter().map(|v| v.as_str().to_string()).collect(),
                    }),
                }
            }
        }
    };
}

/// Publication state of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ProductStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

string_enum!(ProductStatus, "status" {
    Draft => "draft",
    Published => "published",
    Archived => "archived",
});

/// Kind of file attached to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum MediaType {
    #[default]
    Image,
    Video,
    Document,
}

string_enum!(MediaType, "media_type" {
    Image => "image",
    Video => "video",
    Document => "document",
});

/// Order status. Callers set it directly; there is no transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
    Refunded,
}

string_enum!(OrderStatus, "status" {
    Pending => "pending",
    Confirmed => "confirmed",
    Processing => "processing",
    Packed => "packed",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
    Returned => "returned",
    Refunded => "refunded",
});

impl OrderStatus {
    /// Statuses the fulfillment endpoint accepts.
    pub const FULFILLABLE: &'static [OrderStatus] = &[
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Packed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn is_fulfillable(&self) -> bool {
        Self::FULFILLABLE.contains(self)
    }
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
    PartiallyRefunded,
}

string_enum!(PaymentStatus, "payment_status" {
    Pending => "pending",
    Paid => "paid",
    Failed => "failed",
    Refunded => "refunded",
    PartiallyRefunded => "partially_refunded",
});

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Paypal,
    BankTransfer,
    CashOnDelivery,
}

string_enum!(PaymentMethod, "payment_method" {
    CreditCard => "credit_card",
    DebitCard => "debit_card",
    Paypal => "paypal",
    BankTransfer => "bank_transfer",
    CashOnDelivery => "cash_on_delivery",
});

/// Supplier account state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SupplierStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
    Pending,
}

string_enum!(SupplierStatus, "status" {
    Active => "active",
    Inactive => "inactive",
    Suspended => "suspended",
    Pending => "pending",
});

/// Position of a supplier in the supply chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SupplierType {
    #[default]
    Manufacturer,
    Distributor,
    Wholesaler,
    Retailer,
    ServiceProvider,
}

string_enum!(SupplierType, "supplier_type" {
    Manufacturer => "manufacturer",
    Distributor => "distributor",
    Wholesaler => "wholesaler",
    Retailer => "retailer",
    ServiceProvider => "service_provider",
});

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum MovementType {
    In,
    Out,
    Adjustment,
}

string_enum!(MovementType, "movement_type" {
    In => "in",
    Out => "out",
    Adjustment => "adjustment",
});

impl MovementType {
    /// Classifies a signed stock change.
    pub fn for_delta(delta: i64) -> MovementType {
        match delta.signum() {
            1 => MovementType::In,
            -1 => MovementType::Out,
            _ => MovementType::Adjustment,
        }
    }
}

/// Where a customer return stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ReturnStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    ShippedBack,
    Received,
    Refunded,
    Cancelled,
}

string_enum!(ReturnStatus, "status" {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    ShippedBack => "shipped_back",
    Received => "received",
    Refunded => "refunded",
    Cancelled => "cancelled",
});

// =============================================================================
// Category
// =============================================================================

/// A node in the catalog tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Unique URL key.
    pub slug: String,
    pub description: Option<String>,
    /// Parent category; `None` for top-level nodes.
    pub parent_id: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
    pub is_featured: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A category with its nested children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryNode {
    #[serde(flatten)]
    #[ts(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Nests categories under their parents, keeping input order among
    /// siblings. A category whose parent is not in the list becomes a root.
    pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
        let ids: HashSet<String> = categories.iter().map(|c| c.id.clone()).collect();
        let mut children: HashMap<String, Vec<Category>> = HashMap::new();
        let mut roots = Vec::new();

        for category in categories {
            match category.parent_id.clone().filter(|p| ids.contains(p)) {
                Some(parent) => children.entry(parent).or_default().push(category),
                None => roots.push(category),
            }
        }

        roots
            .into_iter()
            .map(|root| Self::attach(root, &mut children))
            .collect()
    }

    fn attach(category: Category, children: &mut HashMap<String, Vec<Category>>) -> CategoryNode {
        let direct = children.remove(&category.id).unwrap_or_default();
        let children = direct
            .into_iter()
            .map(|child| Self::attach(child, children))
            .collect();
        CategoryNode { category, children }
    }
}

/// Counts served by `GET /api/categories/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CategoryStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub root_categories: i64,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub name: String,
    /// Unique URL key.
    pub slug: String,
    pub description: Option<String>,
    pub category_id: String,
    /// Stock Keeping Unit, unique when present.
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub brand: Option<String>,

    /// List price before discounts, in cents.
    pub base_price_cents: i64,
    /// Price the customer pays, in cents.
    pub selling_price_cents: i64,
    pub cost_price_cents: Option<i64>,
    pub discount_bps: u32,
    /// Tax rate in basis points (825 = 8.25%).
    pub tax_rate_bps: u32,

    pub stock_quantity: i64,
    pub min_stock_level: i64,
    pub max_stock_level: Option<i64>,
    /// When false, stock checks are skipped entirely.
    pub track_inventory: bool,

    pub status: ProductStatus,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_digital: bool,
    pub requires_shipping: bool,
    pub weight_grams: Option<i64>,

    pub featured_image_url: Option<String>,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub gallery_images: Vec<String>,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub meta_keywords: Vec<String>,
    /// Free-form attributes (color, size, ...).
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    #[ts(type = "Record<string, unknown>")]
    pub attributes: serde_json::Value,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Tracked and at or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.track_inventory && self.stock_quantity <= self.min_stock_level
    }

    /// Stock after applying `delta`.
    ///
    /// ## Errors
    /// - `Validation` when the result leaves the `i64` range
    /// - `InsufficientStock` when a tracked product would go negative
    pub fn stock_after(&self, delta: i64) -> CoreResult<i64> {
        let next = self.stock_quantity.checked_add(delta).ok_or_else(|| {
            ValidationError::Rule(format!("Stock adjustment of {delta} is out of range"))
        })?;
        if self.track_inventory && next < 0 {
            return Err(CoreError::InsufficientStock {
                product: self.name.clone(),
                available: self.stock_quantity,
                delta,
            });
        }
        Ok(next)
    }
}

// =============================================================================
// Media
// =============================================================================

/// A file attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Media {
    pub id: String,
    pub product_id: String,
    pub file_name: String,
    /// Path relative to the media root.
    pub file_path: String,
    /// Public URL the frontend renders.
    pub url: String,
    pub media_type: MediaType,
    pub mime_type: Option<String>,
    pub file_size_bytes: i64,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub is_primary: bool,
    pub display_order: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Inventory Ledger
// =============================================================================

/// One row of the stock ledger, written by every stock adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    /// Joined from the product when listing.
    pub product_name: Option<String>,
    pub movement_type: MovementType,
    /// Absolute size of the change.
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub reason: Option<String>,
    pub reference: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Ledger totals over a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MovementSummary {
    pub total_movements: i64,
    pub total_stock_in: i64,
    pub total_stock_out: i64,
    pub movements_today: i64,
    pub movements_week: i64,
    pub movements_month: i64,
}

// =============================================================================
// Orders
// =============================================================================

/// Postal address stored as JSON on the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingAddress {
    pub name: String,
    pub address_line_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Human-facing number, `ORD-YYYYMMDD-XXXXXX`.
    pub order_number: String,
    pub customer_id: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub currency: String,

    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub shipping_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,

    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub shipping_address: ShippingAddress,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub billing_address: Option<ShippingAddress>,
    pub notes: Option<String>,

    pub tracking_number: Option<String>,
    pub shipping_carrier: Option<String>,
    pub tracking_url: Option<String>,
    #[ts(as = "Option<String>")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub cancelled_at: Option<DateTime<Utc>>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Line items; loaded separately from the order row.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Stamps the timestamp that matches a newly set status.
    pub fn stamp_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status = status;
        match status {
            OrderStatus::Shipped => self.shipped_at = Some(now),
            OrderStatus::Delivered => self.delivered_at = Some(now),
            OrderStatus::Cancelled => self.cancelled_at = Some(now),
            _ => {}
        }
        self.updated_at = now;
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Name captured at order time.
    pub product_name: String,
    pub sku: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A shipment recorded against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Fulfillment {
    pub id: String,
    pub order_id: String,
    pub fulfillment_status: OrderStatus,
    pub tracking_number: Option<String>,
    pub shipping_carrier: Option<String>,
    pub tracking_url: Option<String>,
    #[ts(as = "Option<String>")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub delivered_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Returns
// =============================================================================

/// A customer return against a shipped order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderReturn {
    pub id: String,
    /// Human-facing number, `RET-YYYYMMDD-XXXXXX`.
    pub return_number: String,
    pub order_id: String,
    pub customer_id: String,
    pub status: ReturnStatus,
    pub reason: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    /// Sum of the item refunds requested.
    pub total_refund_cents: i64,
    /// Amount actually refunded.
    pub refunded_cents: Option<i64>,
    pub refund_method: Option<String>,
    pub refund_transaction_id: Option<String>,
    #[ts(as = "Option<String>")]
    pub approved_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub received_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub refunded_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<ReturnItem>,
}

impl OrderReturn {
    /// Sets the status and the timestamp that goes with it.
    pub fn stamp_status(&mut self, status: ReturnStatus, now: DateTime<Utc>) {
        self.status = status;
        match status {
            ReturnStatus::Approved => self.approved_at = Some(now),
            ReturnStatus::Rejected => self.rejected_at = Some(now),
            ReturnStatus::Received => self.received_at = Some(now),
            ReturnStatus::Refunded => self.refunded_at = Some(now),
            _ => {}
        }
        self.updated_at = now;
    }
}

/// One returned line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ReturnItem {
    pub id: String,
    pub return_id: String,
    pub order_item_id: Option<String>,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub refund_cents: i64,
}

// =============================================================================
// Supplier
// =============================================================================

/// A vendor the business buys from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    /// Short business code, unique when present.
    pub code: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,

    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,

    pub tax_id: Option<String>,
    pub business_registration: Option<String>,
    pub business_type: String,

    pub primary_contact_name: Option<String>,
    pub primary_contact_email: Option<String>,
    pub primary_contact_phone: Option<String>,

    pub payment_terms: Option<String>,
    pub credit_limit_cents: Option<i64>,
    pub currency: String,
    /// 0.0 to 5.0.
    pub rating: Option<f64>,
    pub lead_time_days: Option<i64>,
    pub minimum_order_cents: Option<i64>,

    pub status: SupplierStatus,
    pub supplier_type: SupplierType,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub internal_notes: Option<String>,
    pub created_by: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
