//! `/api/categories`, plus `/tree` (active categories nested by parent)
//! and `/stats`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use stockroom_core::input::CategoryInput;
use stockroom_core::{Category, CategoryNode, CategoryStats};
use stockroom_db::CategoryFilter;
use tracing::info;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::response::{ApiResponse, Paginated};
use crate::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/categories", get(list).post(create))
        .route("/api/categories/tree", get(tree))
        .route("/api/categories/stats", get(stats))
        .route("/api/categories/{id}", get(show).put(update).delete(destroy))
}

async fn list(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<CategoryFilter>,
) -> ApiResult<Json<Paginated<Category>>> {
    let page = state.db.categories().list(&filter).await?;
    Ok(Json(page.into()))
}

async fn tree(State(state): State<SharedState>) -> ApiResult<Json<ApiResponse<Vec<CategoryNode>>>> {
    let tree = state.db.categories().tree().await?;
    Ok(ApiResponse::ok(tree))
}

async fn stats(State(state): State<SharedState>) -> ApiResult<Json<ApiResponse<CategoryStats>>> {
    let stats = state.db.categories().stats().await?;
    Ok(ApiResponse::ok(stats))
}

async fn show(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Category>>> {
    let category = state.db.categories().get_by_id(&id).await?;
    Ok(ApiResponse::ok(category))
}

async fn create(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let category = Category::create(input, Utc::now())?;
    state.db.categories().create(&category).await?;

    info!(id = %category.id, name = %category.name, "Category created via API");
    Ok(ApiResponse::created(category, "Category created successfully"))
}

async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> ApiResult<Json<ApiResponse<Category>>> {
    let repo = state.db.categories();
    let mut category = repo.get_by_id(&id).await?;
    category.apply(input, Utc::now())?;
    repo.update(&category).await?;

    Ok(ApiResponse::with_message(category, "Category updated successfully"))
}

async fn destroy(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.db.categories().delete(&id).await?;
    info!(id = %id, "Category deleted via API");
    Ok(ApiResponse::message("Category deleted successfully"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::test_support::TestApp;

    use super::*;

    #[tokio::test]
    async fn test_create_and_fetch() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post("/api/categories", json!({ "name": "Kitchen & Dining" }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Category created successfully");
        assert_eq!(body["data"]["slug"], "kitchen-dining");

        let id = body["data"]["id"].as_str().unwrap();
        let (status, body) = app.get(&format!("/api/categories/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Kitchen & Dining");
    }

    #[tokio::test]
    async fn test_missing_name_rejected() {
        let app = TestApp::new().await;
        let (status, body) = app.post("/api/categories", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_bad_request() {
        let app = TestApp::new().await;
        app.category("Hats").await;
        let (status, body) = app.post("/api/categories", json!({ "name": "Hats" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Category with this slug already exists");
    }

    #[tokio::test]
    async fn test_update_is_sparse() {
        let app = TestApp::new().await;
        let id = app.category("Hats").await;

        let (status, body) = app
            .put(&format!("/api/categories/{id}"), json!({ "is_featured": true }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_featured"], true);
        assert_eq!(body["data"]["name"], "Hats");

        let (status, _) = app
            .put("/api/categories/missing", json!({ "name": "Caps" }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_refused_while_products_reference_it() {
        let app = TestApp::new().await;
        let id = app.category("Mugs").await;
        app.product("Blue Mug", &id).await;

        let (status, body) = app.delete(&format!("/api/categories/{id}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "IN_USE");

        let (status, _) = app.delete("/api/categories/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let app = TestApp::new().await;
        for name in ["A", "B", "C"] {
            app.category(name).await;
        }
        let (status, body) = app.get("/api/categories?limit=2&page=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rename_to_symbols_is_rejected() {
        let app = TestApp::new().await;
        let id = app.category("Kitchen").await;

        let (status, body) = app
            .put(&format!("/api/categories/{id}"), json!({ "name": "!!!" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (_, body) = app.get(&format!("/api/categories/{id}")).await;
        assert_eq!(body["data"]["slug"], "kitchen");
    }

    #[tokio::test]
    async fn test_parent_must_exist_and_not_cycle() {
        let app = TestApp::new().await;

        let (status, body) = app
            .post("/api/categories", json!({ "name": "Orphan", "parent_id": "missing" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Parent category not found");

        let root = app.category("Kitchen").await;
        let (status, body) = app
            .post("/api/categories", json!({ "name": "Mugs", "parent_id": root }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let child = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = app
            .put(&format!("/api/categories/{root}"), json!({ "parent_id": child }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "A category cannot be nested under its own descendant");

        let (status, _) = app
            .put(&format!("/api/categories/{root}"), json!({ "parent_id": root }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tree_and_stats() {
        let app = TestApp::new().await;
        let kitchen = app.category("Kitchen").await;
        app.category("Garden").await;
        app.post("/api/categories", json!({ "name": "Mugs", "parent_id": kitchen }))
            .await;
        app.post("/api/categories", json!({ "name": "Hidden", "is_active": false }))
            .await;

        let (status, body) = app.get("/api/categories/tree").await;
        assert_eq!(status, StatusCode::OK);
        let roots = body["data"].as_array().unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0]["name"], "Garden");
        assert_eq!(roots[1]["name"], "Kitchen");
        assert_eq!(roots[1]["children"][0]["name"], "Mugs");

        let (status, body) = app.get("/api/categories/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 4);
        assert_eq!(body["data"]["active"], 3);
        assert_eq!(body["data"]["inactive"], 1);
        assert_eq!(body["data"]["root_categories"], 3);
    }
}
