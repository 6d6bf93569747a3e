//! `/api/orders/returns`
//!
//! ```text
//! GET    /api/orders/returns              ?status&customer_id
//! POST   /api/orders/returns              order must have shipped (201)
//! GET    /api/orders/returns/{id}
//! PUT    /api/orders/returns/{id}         status and notes
//! DELETE /api/orders/returns/{id}         pending only
//! POST   /api/orders/returns/{id}/refund  approved only
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use stockroom_core::returns::{CreateReturnRequest, RefundRequest, ReturnPatch};
use stockroom_core::OrderReturn;
use stockroom_db::ReturnFilter;
use tracing::info;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::response::ApiResponse;
use crate::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/orders/returns", get(list).post(create))
        .route("/api/orders/returns/{id}", get(show).put(update).delete(destroy))
        .route("/api/orders/returns/{id}/refund", post(refund))
}

async fn list(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<ReturnFilter>,
) -> ApiResult<Json<ApiResponse<Vec<OrderReturn>>>> {
    let returns = state.db.returns().list(&filter).await?;
    Ok(ApiResponse::ok(returns))
}

async fn show(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<OrderReturn>>> {
    let ret = state.db.returns().get_by_id(&id).await?;
    Ok(ApiResponse::ok(ret))
}

async fn create(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<CreateReturnRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<OrderReturn>>)> {
    let validated = request.validate()?;
    let ret = state.db.returns().create(validated).await?;

    info!(id = %ret.id, return_number = %ret.return_number, "Return created via API");
    Ok(ApiResponse::created(ret, "Return request created successfully"))
}

async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ReturnPatch>,
) -> ApiResult<Json<ApiResponse<OrderReturn>>> {
    let ret = state.db.returns().update_with(&id, patch).await?;
    Ok(ApiResponse::with_message(ret, "Return updated successfully"))
}

async fn refund(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<RefundRequest>,
) -> ApiResult<Json<ApiResponse<OrderReturn>>> {
    let ret = state.db.returns().refund(&id, request).await?;
    Ok(ApiResponse::with_message(ret, "Refund processed successfully"))
}

async fn destroy(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.db.returns().delete(&id).await?;
    info!(id = %id, "Return deleted via API");
    Ok(ApiResponse::message("Return deleted successfully"))
}
