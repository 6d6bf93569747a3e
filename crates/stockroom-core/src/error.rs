//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  admin-api errors (in app)                                             │
//! │  └── ApiError         - Status code + envelope the client sees         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → HTTP         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Another record already owns this slug.
    ///
    /// ## When This Occurs
    /// - Creating a category/product whose name slugifies to an existing slug
    /// - Renaming a record onto another record's slug
    #[error("{entity} with this slug already exists")]
    SlugConflict { entity: String, slug: String },

    /// Another supplier already owns this code.
    #[error("Supplier code '{0}' already exists")]
    SupplierCodeConflict(String),

    /// A tracked product would drop below zero stock.
    #[error("Insufficient stock for {product}: available {available}, requested change {delta}")]
    InsufficientStock {
        product: String,
        available: i64,
        delta: i64,
    },

    /// The record's current status does not allow the operation.
    ///
    /// ## When This Occurs
    /// - Refunding a return that has not been approved
    /// - Deleting a return that is no longer pending
    /// - Opening a return on an order that never shipped
    #[error("Cannot {action} {entity} in status '{status}'")]
    InvalidStatus {
        entity: String,
        status: String,
        action: String,
    },

    /// A record cannot be removed while others depend on it.
    #[error("Cannot delete {entity}: {reason}")]
    InUse { entity: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a slug conflict for the given entity label.
    pub fn slug_conflict(entity: impl Into<String>, slug: impl Into<String>) -> Self {
        CoreError::SlugConflict {
            entity: entity.into(),
            slug: slug.into(),
        }
    }

    pub fn invalid_status(
        entity: impl Into<String>,
        status: impl fmt::Display,
        action: impl Into<String>,
    ) -> Self {
        CoreError::InvalidStatus {
            entity: entity.into(),
            status: status.to_string(),
            action: action.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid email, invalid color).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Rule that spans fields (selling price vs base price, etc.).
    #[error("{0}")]
    Rule(String),

    /// Several independent problems collected in one pass.
    #[error("Validation failed")]
    Many(Vec<String>),
}

impl ValidationError {
    /// Creates a `Required` error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Flattens this error into user-facing messages.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ValidationError::Many(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
