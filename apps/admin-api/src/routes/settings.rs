//! `/api/settings/company` and `/api/settings/invoice`.
//!
//! Both sections share one pair of handlers: read returns the stored
//! document or its defaults, write validates and replaces the whole
//! document.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use stockroom_core::settings::SettingsDocument;
use stockroom_core::{CompanySettings, InvoiceSettings};
use tracing::info;

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::response::ApiResponse;
use crate::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/api/settings/company",
            get(show::<CompanySettings>).put(save::<CompanySettings>),
        )
        .route(
            "/api/settings/invoice",
            get(show::<InvoiceSettings>).put(save::<InvoiceSettings>),
        )
}

async fn show<T: SettingsDocument + 'static>(
    State(state): State<SharedState>,
) -> ApiResult<Json<ApiResponse<T>>> {
    let document = state.db.settings().get::<T>().await?;
    Ok(ApiResponse::ok(document))
}

async fn save<T: SettingsDocument + 'static>(
    State(state): State<SharedState>,
    ApiJson(document): ApiJson<T>,
) -> ApiResult<Json<ApiResponse<T>>> {
    state.db.settings().put(&document).await?;
    info!(section = T::SECTION, "Settings saved via API");
    Ok(ApiResponse::with_message(document, "Settings saved successfully"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_unsaved_settings_return_defaults() {
        let app = TestApp::new().await;

        let (status, body) = app.get("/api/settings/company").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["company_name"], "Acme Corporation");
        assert_eq!(body["data"]["primary_color"], "#3b82f6");

        let (_, body) = app.get("/api/settings/invoice").await;
        assert_eq!(body["data"]["invoice_prefix"], "INV-");
        assert_eq!(body["data"]["next_invoice_number"], 1001);
    }

    #[tokio::test]
    async fn test_save_then_read_back() {
        let app = TestApp::new().await;

        let (status, _) = app
            .put(
                "/api/settings/company",
                json!({ "company_name": "Globex", "email": "hello@globex.test" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = app.get("/api/settings/company").await;
        assert_eq!(body["data"]["company_name"], "Globex");
        assert_eq!(body["data"]["email"], "hello@globex.test");
        assert_eq!(body["data"]["secondary_color"], "#10b981");
    }

    #[tokio::test]
    async fn test_invalid_documents_are_rejected() {
        let app = TestApp::new().await;

        let (status, body) = app
            .put(
                "/api/settings/company",
                json!({ "company_name": "", "primary_color": "blue" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);

        let (status, _) = app
            .put("/api/settings/invoice", json!({ "reminder_days": [14, 7] }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = app.get("/api/settings/invoice").await;
        assert_eq!(body["data"]["invoice_prefix"], "INV-");
    }
}
