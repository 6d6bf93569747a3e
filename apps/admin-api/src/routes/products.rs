//! `/api/products`
//!
//! Deleting a product removes its media files first. A file that cannot be
//! removed is only logged; the rows are deleted regardless.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use stockroom_core::input::ProductInput;
use stockroom_core::{Product, ProductStatus};
use stockroom_db::{ProductFilter, ProductStats};
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::response::{ApiResponse, Paginated};
use crate::SharedState;

/// Body of `POST /api/products/{id}/stock`.
#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    pub delta: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/stats", get(stats))
        .route("/api/products/{id}", get(show).put(update).delete(destroy))
        .route("/api/products/{id}/publish", post(publish))
        .route("/api/products/{id}/archive", post(archive))
        .route("/api/products/{id}/stock", post(adjust_stock))
}

async fn list(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> ApiResult<Json<Paginated<Product>>> {
    let page = state.db.products().list(&filter).await?;
    Ok(Json(page.into()))
}

async fn stats(State(state): State<SharedState>) -> ApiResult<Json<ApiResponse<ProductStats>>> {
    let stats = state.db.products().stats().await?;
    Ok(ApiResponse::ok(stats))
}

async fn show(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    let product = state.db.products().get_by_id(&id).await?;
    Ok(ApiResponse::ok(product))
}

async fn create(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let product = Product::create(input, Utc::now())?;
    state.db.products().create(&product).await?;

    info!(id = %product.id, name = %product.name, "Product created via API");
    Ok(ApiResponse::created(product, "Product created successfully"))
}

async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    let repo = state.db.products();
    let mut product = repo.get_by_id(&id).await?;
    product.apply(input, Utc::now())?;
    repo.update(&product).await?;

    Ok(ApiResponse::with_message(product, "Product updated successfully"))
}

async fn publish(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    let product = state.db.products().set_status(&id, ProductStatus::Published).await?;
    Ok(ApiResponse::with_message(product, "Product published"))
}

async fn archive(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    let product = state.db.products().set_status(&id, ProductStatus::Archived).await?;
    Ok(ApiResponse::with_message(product, "Product archived"))
}

async fn adjust_stock(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StockAdjustment>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    let product = state
        .db
        .products()
        .adjust_stock(&id, body.delta, body.reason.as_deref())
        .await?;
    Ok(ApiResponse::ok(product))
}

async fn destroy(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let product = state.db.products().get_by_id(&id).await?;

    let media = state.db.media().all_for_product(&product.id).await?;
    let mut kept = 0usize;
    for item in &media {
        if !state.storage.remove(&item.file_path).await {
            kept += 1;
        }
    }
    if kept > 0 {
        warn!(id = %id, files = kept, "Some media files were not removed");
    }

    state.db.products().delete(&id).await?;
    info!(id = %id, media = media.len(), "Product deleted via API");
    Ok(ApiResponse::message("Product deleted successfully"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::test_support::{FilePart, TestApp};

    use super::*;

    #[tokio::test]
    async fn test_create_returns_created_with_message() {
        let app = TestApp::new().await;
        let category = app.category("Mugs").await;

        let (status, body) = app
            .post(
                "/api/products",
                json!({
                    "name": "Blue Mug",
                    "category_id": category,
                    "base_price_cents": 800,
                    "selling_price_cents": 1200
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Product created successfully");
        assert_eq!(body["data"]["slug"], "blue-mug");
        assert_eq!(body["data"]["status"], "draft");
    }

    #[tokio::test]
    async fn test_create_requires_core_fields_and_known_category() {
        let app = TestApp::new().await;

        let (status, body) = app.post("/api/products", json!({ "name": "Mug" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Name, category_id, base_price, and selling_price are required"
        );

        let (status, body) = app
            .post(
                "/api/products",
                json!({
                    "name": "Mug",
                    "category_id": "nope",
                    "base_price_cents": 800,
                    "selling_price_cents": 1200
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Category not found");
    }

    #[tokio::test]
    async fn test_update_onto_taken_slug_is_bad_request() {
        let app = TestApp::new().await;
        let category = app.category("Mugs").await;
        app.product("Blue Mug", &category).await;
        let red = app.product("Red Mug", &category).await;
        let red_id = red["id"].as_str().unwrap();

        let (status, body) = app
            .put(&format!("/api/products/{red_id}"), json!({ "slug": "blue-mug" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "SLUG_CONFLICT");
        assert_eq!(body["error"], "Product with this slug already exists");
    }

    #[tokio::test]
    async fn test_update_renames_and_regenerates_slug() {
        let app = TestApp::new().await;
        let category = app.category("Mugs").await;
        let mug = app.product("Blue Mug", &category).await;
        let id = mug["id"].as_str().unwrap();

        let (status, body) = app
            .put(&format!("/api/products/{id}"), json!({ "name": "Navy Mug" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["slug"], "navy-mug");
        assert_eq!(body["data"]["selling_price_cents"], 1500);

        let (status, _) = app
            .put("/api/products/missing", json!({ "name": "Ghost" }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_publish_and_archive() {
        let app = TestApp::new().await;
        let category = app.category("Mugs").await;
        let mug = app.product("Blue Mug", &category).await;
        let id = mug["id"].as_str().unwrap();

        let (status, body) = app
            .send(axum::http::Method::POST, &format!("/api/products/{id}/publish"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "published");

        let (_, body) = app
            .send(axum::http::Method::POST, &format!("/api/products/{id}/archive"), None)
            .await;
        assert_eq!(body["data"]["status"], "archived");
    }

    #[tokio::test]
    async fn test_stock_cannot_go_negative() {
        let app = TestApp::new().await;
        let category = app.category("Mugs").await;
        let mug = app.product("Blue Mug", &category).await;
        let id = mug["id"].as_str().unwrap();

        let (status, body) = app
            .post(&format!("/api/products/{id}/stock"), json!({ "delta": -4, "reason": "breakage" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["stock_quantity"], 6);

        let (status, body) = app
            .post(&format!("/api/products/{id}/stock"), json!({ "delta": -7 }))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    }

    #[tokio::test]
    async fn test_stock_overflow_is_rejected() {
        let app = TestApp::new().await;
        let category = app.category("Mugs").await;
        let mug = app.product("Blue Mug", &category).await;
        let id = mug["id"].as_str().unwrap();

        for delta in [i64::MAX, i64::MIN] {
            let (status, body) = app
                .post(&format!("/api/products/{id}/stock"), json!({ "delta": delta }))
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(body["code"], "VALIDATION_ERROR");
        }

        let (_, body) = app.get(&format!("/api/products/{id}")).await;
        assert_eq!(body["data"]["stock_quantity"], 10);
        let (_, body) = app.get(&format!("/api/products/{id}/movements")).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_media_rows_and_files() {
        let app = TestApp::new().await;
        let category = app.category("Mugs").await;
        let mug = app.product("Blue Mug", &category).await;
        let id = mug["id"].as_str().unwrap();

        let mut stored = Vec::new();
        for name in ["front.jpg", "gone.jpg"] {
            let (status, body) = app
                .upload(
                    &format!("/api/products/{id}/media"),
                    &[],
                    Some(FilePart { file_name: name, content_type: "image/jpeg", bytes: b"jpeg" }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            stored.push(app.media_dir.path().join(body["data"]["file_path"].as_str().unwrap()));
        }

        // The second file vanishes from disk; the delete must still succeed.
        std::fs::remove_file(&stored[1]).unwrap();
        let (status, body) = app.delete(&format!("/api/products/{id}")).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["message"], "Product deleted successfully");
        assert!(!stored[0].exists());

        let remaining = app.state.db.media().all_for_product(id).await.unwrap();
        assert!(remaining.is_empty());

        let (status, _) = app.get(&format!("/api/products/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let app = TestApp::new().await;
        let (status, body) = app.delete("/api/products/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_list_filters_and_stats() {
        let app = TestApp::new().await;
        let category = app.category("Mugs").await;
        app.product("Blue Mug", &category).await;
        app.product("Red Mug", &category).await;

        let (status, body) = app.get("/api/products?search=blue").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["name"], "Blue Mug");

        let (status, body) = app.get("/api/products?status=bogus").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (_, body) = app.get("/api/products/stats").await;
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["draft"], 2);
    }
}
