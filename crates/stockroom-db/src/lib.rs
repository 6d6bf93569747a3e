//! # stockroom-db: Database Layer for Stockroom
//!
//! SQLite persistence for the back-office: catalog, orders, suppliers and
//! settings, accessed through async `sqlx`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  axum handler (admin-api)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockroom-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ Category       │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Product, Media │   │ 001_catalog  │  │   │
//! │  │   │               │    │ Order          │   │ 002_orders   │  │   │
//! │  │   │               │    │ Supplier       │   │ 003_supplier │  │   │
//! │  │   │               │    │ Settings, Dash │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite database file (database.path in stockroom.toml)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per entity, plus filters and paging
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("data/stockroom.db")).await?;
//! let page = db.products().list(&ProductFilter::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::{
    CategoryFilter, CategoryRepository, DashboardRepository, DashboardStats, MediaRepository,
    MovementFilter, MovementRepository, OrderFilter, OrderRepository, OrderStats, Page,
    PageRequest, ProductFilter, ProductRepository, ProductStats, ReturnFilter, ReturnRepository,
    SettingsRepository, SupplierFilter, SupplierRepository, SupplierSummary,
};
