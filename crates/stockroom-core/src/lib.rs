//! # stockroom-core: Domain Rules for Stockroom
//!
//! Everything the back-office knows about products, orders, suppliers and
//! settings that does not need a database or a socket lives here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Admin frontend (browser)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/admin-api (axum)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   slug    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ slugify   │  │  orders   │  │   │
//! │  │   │  Order    │  │  TaxRate  │  │           │  │  settings │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stockroom-db (Database Layer)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities and status enums
//! - [`input`] - Create/update bodies and sparse merges
//! - [`order`] - Order validation, totals and fulfillment requests
//! - [`returns`] - Customer returns and refunds
//! - [`money`] - Integer money and basis-point rates
//! - [`slug`] - URL keys derived from names
//! - [`validation`] - Input rules for every write path
//! - [`settings`] - Company and invoice settings documents
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::money::{Money, TaxRate};
//! use stockroom_core::slug::slugify;
//!
//! let price = Money::from_cents(1099);
//! let tax = price.calculate_tax(TaxRate::from_bps(825));
//! assert_eq!(tax.cents(), 91);
//!
//! assert_eq!(slugify("Summer Sale: Hats!"), "summer-sale-hats");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod input;
pub mod money;
pub mod order;
pub mod returns;
pub mod settings;
pub mod slug;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate};
pub use order::{OrderTotals, ValidatedOrder};
pub use settings::{CompanySettings, InvoiceSettings};
pub use types::*;

// =============================================================================
// Constants
// =============================================================================

/// Currency used when a record does not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Largest page size any list endpoint will return.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Maximum number of line items on a single order.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity of a single order line.
pub const MAX_LINE_QUANTITY: i64 = 10_000;

/// Highest accepted unit price on an order line (1,000,000.00).
pub const MAX_UNIT_PRICE_CENTS: i64 = 100_000_000;

/// Highest accepted shipping charge or discount on an order (1,000,000.00).
pub const MAX_ADJUSTMENT_CENTS: i64 = 100_000_000;

/// Author recorded on suppliers created without one.
pub const SYSTEM_ACTOR: &str = "system";
