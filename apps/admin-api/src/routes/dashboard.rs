//! `/api/dashboard`

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use stockroom_core::{Product, MAX_PAGE_LIMIT};
use stockroom_db::DashboardStats;

use crate::error::ApiResult;
use crate::extract::ApiQuery;
use crate::response::ApiResponse;
use crate::SharedState;

const DEFAULT_LOW_STOCK_LIMIT: u32 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LowStockQuery {
    pub limit: Option<u32>,
}

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/dashboard/stats", get(stats))
        .route("/api/dashboard/low-stock", get(low_stock))
}

async fn stats(State(state): State<SharedState>) -> ApiResult<Json<ApiResponse<DashboardStats>>> {
    let stats = state.db.dashboard().stats().await?;
    Ok(ApiResponse::ok(stats))
}

async fn low_stock(
    State(state): State<SharedState>,
    ApiQuery(query): ApiQuery<LowStockQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Product>>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LOW_STOCK_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT);
    let products = state.db.dashboard().low_stock(limit).await?;
    Ok(ApiResponse::ok(products))
}
