//! `/api/orders`
//!
//! ```text
//! GET    /api/orders                    filtered page, newest first
//! GET    /api/orders/stats
//! GET    /api/orders/status/{status}
//! GET    /api/orders/customer/{email}
//! POST   /api/orders                    validate → price → store (201)
//! PUT    /api/orders/bulk-fulfill       each order independently
//! GET    /api/orders/{id}
//! PUT    /api/orders/{id}               sparse update
//! PUT    /api/orders/{id}/fulfill
//! GET    /api/orders/{id}/fulfillments
//! DELETE /api/orders/{id}
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Serialize;
use stockroom_core::order::{BulkFulfillRequest, CreateOrderRequest, FulfillRequest, OrderPatch};
use stockroom_core::{Fulfillment, Order, OrderStatus};
use stockroom_db::{OrderFilter, OrderStats};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::response::{ApiResponse, Paginated};
use crate::SharedState;

/// Outcome for one order of a bulk request.
#[derive(Debug, Serialize)]
pub struct BulkOutcome {
    pub order_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkFulfillResult {
    pub results: Vec<BulkOutcome>,
    pub processed_count: usize,
    pub failed_count: usize,
}

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/orders", get(list).post(create))
        .route("/api/orders/stats", get(stats))
        .route("/api/orders/status/{status}", get(by_status))
        .route("/api/orders/customer/{email}", get(by_customer))
        .route("/api/orders/bulk-fulfill", put(bulk_fulfill))
        .route("/api/orders/{id}", get(show).put(update).delete(destroy))
        .route("/api/orders/{id}/fulfill", put(fulfill))
        .route("/api/orders/{id}/fulfillments", get(fulfillments))
}

async fn list(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<OrderFilter>,
) -> ApiResult<Json<Paginated<Order>>> {
    let page = state.db.orders().list(&filter).await?;
    Ok(Json(page.into()))
}

async fn stats(State(state): State<SharedState>) -> ApiResult<Json<ApiResponse<OrderStats>>> {
    let stats = state.db.orders().stats().await?;
    Ok(ApiResponse::ok(stats))
}

async fn by_status(
    State(state): State<SharedState>,
    Path(status): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Order>>>> {
    let status: OrderStatus = status.parse()?;
    let orders = state.db.orders().by_status(status).await?;
    Ok(ApiResponse::ok(orders))
}

async fn by_customer(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Order>>>> {
    let orders = state.db.orders().by_customer_email(&email).await?;
    Ok(ApiResponse::ok(orders))
}

async fn show(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Order>>> {
    let order = state.db.orders().get_by_id(&id).await?;
    Ok(ApiResponse::ok(order))
}

async fn create(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let validated = request.validate()?;
    let order = state.db.orders().create(validated).await?;

    info!(
        id = %order.id,
        order_number = %order.order_number,
        total_cents = order.total_cents,
        "Order created via API"
    );
    Ok(ApiResponse::created(order, "Order created successfully"))
}

async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<OrderPatch>,
) -> ApiResult<Json<ApiResponse<Order>>> {
    let order = state.db.orders().update_with(&id, patch).await?;
    Ok(ApiResponse::with_message(order, "Order updated successfully"))
}

async fn fulfill(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<FulfillRequest>,
) -> ApiResult<Json<ApiResponse<Order>>> {
    let status = request.target_status()?;
    let order = state
        .db
        .orders()
        .fulfill(&id, status, request.shipment_info)
        .await?;
    Ok(ApiResponse::with_message(order, format!("Order marked as {status}")))
}

/// Applies one action to many orders. A failing order is reported in the
/// results and does not stop the batch.
async fn bulk_fulfill(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<BulkFulfillRequest>,
) -> ApiResult<Json<ApiResponse<BulkFulfillResult>>> {
    if request.order_ids.is_empty() {
        return Err(ApiError::bad_request("order_ids must not be empty"));
    }

    let status = request.action.target_status();
    let repo = state.db.orders();
    let mut results = Vec::with_capacity(request.order_ids.len());

    for order_id in request.order_ids {
        match repo.set_status(&order_id, status).await {
            Ok(order) => results.push(BulkOutcome {
                order_id,
                success: true,
                status: Some(order.status),
                error: None,
            }),
            Err(e) => {
                warn!(order_id = %order_id, error = %e, "Bulk fulfillment failed for order");
                results.push(BulkOutcome {
                    order_id,
                    success: false,
                    status: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let processed_count = results.iter().filter(|r| r.success).count();
    let failed_count = results.len() - processed_count;
    info!(action = ?request.action, processed_count, failed_count, "Bulk fulfillment finished");

    Ok(ApiResponse::with_message(
        BulkFulfillResult {
            results,
            processed_count,
            failed_count,
        },
        format!("Processed {processed_count} orders, {failed_count} failed"),
    ))
}

async fn fulfillments(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Fulfillment>>>> {
    let history = state.db.orders().fulfillments(&id).await?;
    Ok(ApiResponse::ok(history))
}

async fn destroy(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.db.orders().delete(&id).await?;
    info!(id = %id, "Order deleted via API");
    Ok(ApiResponse::message("Order deleted successfully"))
}
