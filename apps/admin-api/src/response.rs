//! JSON envelope shared by every endpoint.
//!
//! ```text
//! { "success": true, "data": {...}, "message": "Product created successfully" }
//! { "success": true, "data": [...], "total": 42, "page": 1, "limit": 20, "total_pages": 3 }
//! ```

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use stockroom_db::Page;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(ApiResponse {
            success: true,
            data: Some(data),
            message: None,
        })
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(ApiResponse {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        })
    }

    /// 201 with the new record.
    pub fn created(data: T, message: impl Into<String>) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Self::with_message(data, message))
    }
}

impl ApiResponse<()> {
    /// Success with only a message (deletes).
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(ApiResponse {
            success: true,
            data: None,
            message: Some(message.into()),
        })
    }
}

/// Paginated success envelope.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

impl<T> From<Page<T>> for Paginated<T> {
    fn from(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        Paginated {
            success: true,
            data: page.items,
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_shape() {
        let page = Page {
            items: vec![1, 2],
            total: 21,
            page: 2,
            limit: 10,
        };
        let json = serde_json::to_value(Paginated::from(page)).unwrap();
        assert_eq!(json["total_pages"], 3);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
        assert_eq!(json["success"], true);
    }

    #[test]
    fn test_message_only_omits_data() {
        let Json(body) = ApiResponse::message("Order deleted successfully");
        let json = serde_json::to_value(body).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["message"], "Order deleted successfully");
    }
}
