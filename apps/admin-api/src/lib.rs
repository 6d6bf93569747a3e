//! # Stockroom Admin API
//!
//! axum server for the back-office: catalog, media, orders, suppliers,
//! settings and the dashboard.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP request                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TraceLayer ──► Router (/api/...) ──► handler                          │
//! │                                          │                              │
//! │                    ApiJson / ApiQuery ◄──┤ (400 on malformed input)     │
//! │                                          ▼                              │
//! │                        stockroom-core: validate / merge                 │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                        stockroom-db: repository call                    │
//! │                                          │                              │
//! │                                          ▼                              │
//! │              ApiResponse / Paginated  or  ApiError (status + envelope)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use stockroom_db::Database;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod extract;
pub mod response;
pub mod routes;
pub mod storage;

use crate::config::AppConfig;
use crate::storage::MediaStorage;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub storage: MediaStorage,
    pub config: AppConfig,
}

/// Shared state as handlers see it.
pub type SharedState = Arc<AppState>;

/// Builds the full router with tracing and the upload body limit.
pub fn router(state: SharedState) -> Router {
    let body_limit = state.config.media.body_limit();
    routes::router()
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use stockroom_db::DbConfig;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;

    /// Router over an in-memory database and a scratch media directory.
    pub(crate) struct TestApp {
        pub router: Router,
        pub state: SharedState,
        pub media_dir: TempDir,
    }

    /// A file part of a multipart upload.
    pub(crate) struct FilePart<'a> {
        pub file_name: &'a str,
        pub content_type: &'a str,
        pub bytes: &'a [u8],
    }

    const BOUNDARY: &str = "stockroom-test-boundary";

    impl TestApp {
        pub async fn new() -> Self {
            Self::with_config(AppConfig::default()).await
        }

        pub async fn with_config(config: AppConfig) -> Self {
            let media_dir = tempfile::tempdir().unwrap();
            let db = Database::new(DbConfig::in_memory()).await.unwrap();
            let state = Arc::new(AppState {
                db,
                storage: MediaStorage::new(media_dir.path(), "/media"),
                config,
            });
            TestApp {
                router: router(state.clone()),
                state,
                media_dir,
            }
        }

        pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let builder = Request::builder().method(method).uri(uri);
            let request = match body {
                Some(json) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            self.call(request).await
        }

        async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }

        /// POSTs a `multipart/form-data` body of text fields and an
        /// optional file part named `file`.
        pub async fn upload(
            &self,
            uri: &str,
            fields: &[(&str, &str)],
            file: Option<FilePart<'_>>,
        ) -> (StatusCode, Value) {
            let mut body = Vec::new();
            for (name, value) in fields {
                body.extend_from_slice(
                    format!(
                        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                    )
                    .as_bytes(),
                );
            }
            if let Some(file) = file {
                body.extend_from_slice(
                    format!(
                        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        file.file_name, file.content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(file.bytes);
                body.extend_from_slice(b"\r\n");
            }
            body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

            let request = Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
                .body(Body::from(body))
                .unwrap();
            self.call(request).await
        }

        pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Method::GET, uri, None).await
        }

        pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.send(Method::POST, uri, Some(body)).await
        }

        pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.send(Method::PUT, uri, Some(body)).await
        }

        pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Method::DELETE, uri, None).await
        }

        /// Creates a category through the API and returns its id.
        pub async fn category(&self, name: &str) -> String {
            let (status, body) = self
                .post("/api/categories", serde_json::json!({ "name": name }))
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            body["data"]["id"].as_str().unwrap().to_string()
        }

        /// Creates a product through the API and returns its body.
        pub async fn product(&self, name: &str, category_id: &str) -> Value {
            let (status, body) = self
                .post(
                    "/api/products",
                    serde_json::json!({
                        "name": name,
                        "category_id": category_id,
                        "base_price_cents": 1000,
                        "selling_price_cents": 1500,
                        "stock_quantity": 10,
                        "min_stock_level": 2,
                        "tax_rate_bps": 825
                    }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            body["data"].clone()
        }
    }
}
