//! HTTP routes, one module per resource.
//!
//! ```text
//! /health
//! /api/categories      /api/products        /api/products/{id}/media
//! /api/media/{id}      /api/orders          /api/orders/returns
//! /api/movements       /api/suppliers       /api/settings
//! /api/dashboard
//! ```

use axum::Router;

use crate::SharedState;

pub mod categories;
pub mod dashboard;
pub mod health;
pub mod media;
pub mod movements;
pub mod orders;
pub mod products;
pub mod returns;
pub mod settings;
pub mod suppliers;

/// All routes, before state and middleware are attached.
pub fn router() -> Router<SharedState> {
    Router::new()
        .merge(health::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(media::router())
        .merge(orders::router())
        .merge(returns::router())
        .merge(movements::router())
        .merge(suppliers::router())
        .merge(settings::router())
        .merge(dashboard::router())
}
