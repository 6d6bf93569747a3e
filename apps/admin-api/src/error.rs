//! # API Error Type
//!
//! Every handler returns [`ApiResult`]; failures become an error envelope
//! with a matching status code.
//!
//! ## Status Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbError::NotFound                          → 404 NOT_FOUND             │
//! │  ValidationError / body or query rejection  → 400 VALIDATION_ERROR      │
//! │  CoreError::SlugConflict                    → 400 SLUG_CONFLICT         │
//! │  CoreError::InUse                           → 400 IN_USE                │
//! │  CoreError::InvalidStatus                   → 400 INVALID_STATUS        │
//! │  CoreError::SupplierCodeConflict            → 409 CONFLICT              │
//! │  DbError::UniqueViolation                   → 409 CONFLICT              │
//! │  CoreError::InsufficientStock               → 422 INSUFFICIENT_STOCK    │
//! │  StorageError                               → 500 STORAGE_ERROR         │
//! │  anything else                              → 500 DATABASE_ERROR        │
//! │                                               (raw database message)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Body
//! ```json
//! {
//!   "success": false,
//!   "code": "VALIDATION_ERROR",
//!   "error": "Validation failed",
//!   "errors": ["Customer ID is required", "Invalid country"]
//! }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stockroom_core::{CoreError, ValidationError};
use stockroom_db::DbError;
use tracing::{error, warn};

use crate::storage::StorageError;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,
    /// Input validation failed (400)
    ValidationError,
    /// Slug already used by another record (400)
    SlugConflict,
    /// Record still referenced (400)
    InUse,
    /// Record's status forbids the action (400)
    InvalidStatus,
    /// Unique value already taken (409)
    Conflict,
    /// Stock would go negative (422)
    InsufficientStock,
    /// Database operation failed (500)
    DatabaseError,
    /// Media file could not be written (500)
    StorageError,
}

/// HTTP error with its status, code, message and collected field errors.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
    pub errors: Option<Vec<String>>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
            errors: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::NOT_FOUND, ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, message)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    code: ErrorCode,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [String]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, code = ?self.code, message = %self.message, "Request failed");
        } else {
            warn!(status = %self.status, code = ?self.code, message = %self.message, "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            code: self.code,
            error: &self.message,
            errors: self.errors.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let errors = match &err {
            ValidationError::Many(messages) => Some(messages.clone()),
            _ => None,
        };
        ApiError {
            status: StatusCode::BAD_REQUEST,
            code: ErrorCode::ValidationError,
            message: err.to_string(),
            errors,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(inner) => inner.into(),
            CoreError::SlugConflict { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::SlugConflict, err.to_string())
            }
            CoreError::InUse { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::InUse, err.to_string())
            }
            CoreError::InvalidStatus { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::InvalidStatus, err.to_string())
            }
            CoreError::SupplierCodeConflict(_) => {
                ApiError::new(StatusCode::CONFLICT, ErrorCode::Conflict, err.to_string())
            }
            CoreError::InsufficientStock { .. } => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::InsufficientStock,
                err.to_string(),
            ),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::not_found(err.to_string()),
            DbError::Core(core) => core.into(),
            DbError::UniqueViolation { .. } => {
                ApiError::new(StatusCode::CONFLICT, ErrorCode::Conflict, err.to_string())
            }
            other => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DatabaseError,
                other.to_string(),
            ),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::StorageError, err.to_string())
    }
}
