//! Stock movement ledger, read-only.
//!
//! ```text
//! GET /api/movements                  ?product_id&movement_type&days&limit
//! GET /api/movements/summary
//! GET /api/products/{id}/movements    full history of one product
//! ```

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use stockroom_core::{MovementSummary, StockMovement};
use stockroom_db::MovementFilter;

use crate::error::ApiResult;
use crate::extract::ApiQuery;
use crate::response::ApiResponse;
use crate::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/movements", get(list))
        .route("/api/movements/summary", get(summary))
        .route("/api/products/{id}/movements", get(for_product))
}

async fn list(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<MovementFilter>,
) -> ApiResult<Json<ApiResponse<Vec<StockMovement>>>> {
    let movements = state.db.movements().list(&filter).await?;
    Ok(ApiResponse::ok(movements))
}

async fn summary(State(state): State<SharedState>) -> ApiResult<Json<ApiResponse<MovementSummary>>> {
    let summary = state.db.movements().summary().await?;
    Ok(ApiResponse::ok(summary))
}

async fn for_product(
    State(state): State<SharedState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<StockMovement>>>> {
    let movements = state.db.movements().for_product(&product_id).await?;
    Ok(ApiResponse::ok(movements))
}
