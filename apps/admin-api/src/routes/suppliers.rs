//! `/api/suppliers`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use stockroom_core::input::SupplierInput;
use stockroom_core::Supplier;
use stockroom_db::{SupplierFilter, SupplierSummary};
use tracing::info;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::response::{ApiResponse, Paginated};
use crate::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/suppliers", get(list).post(create))
        .route("/api/suppliers/summary", get(summary))
        .route("/api/suppliers/{id}", get(show).put(update).delete(destroy))
}

async fn list(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<SupplierFilter>,
) -> ApiResult<Json<Paginated<Supplier>>> {
    let page = state.db.suppliers().list(&filter).await?;
    Ok(Json(page.into()))
}

async fn summary(State(state): State<SharedState>) -> ApiResult<Json<ApiResponse<SupplierSummary>>> {
    let summary = state.db.suppliers().summary().await?;
    Ok(ApiResponse::ok(summary))
}

async fn show(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Supplier>>> {
    let supplier = state.db.suppliers().get_by_id(&id).await?;
    Ok(ApiResponse::ok(supplier))
}

async fn create(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<SupplierInput>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Supplier>>)> {
    let supplier = Supplier::create(input, Utc::now())?;
    state.db.suppliers().create(&supplier).await?;

    info!(id = %supplier.id, name = %supplier.name, "Supplier created via API");
    Ok(ApiResponse::created(supplier, "Supplier created successfully"))
}

async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<SupplierInput>,
) -> ApiResult<Json<ApiResponse<Supplier>>> {
    let repo = state.db.suppliers();
    let mut supplier = repo.get_by_id(&id).await?;
    supplier.apply(input, Utc::now())?;
    repo.update(&supplier).await?;

    Ok(ApiResponse::with_message(supplier, "Supplier updated successfully"))
}

async fn destroy(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.db.suppliers().delete(&id).await?;
    info!(id = %id, "Supplier deleted via API");
    Ok(ApiResponse::message("Supplier deleted successfully"))
}
