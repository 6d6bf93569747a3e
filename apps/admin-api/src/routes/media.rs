//! Product media: `/api/products/{id}/media` and `/api/media/{id}`.
//!
//! ## Upload
//! `POST /api/products/{id}/media` takes `multipart/form-data`:
//!
//! | field        | required | notes                                        |
//! |--------------|----------|----------------------------------------------|
//! | `file`       | yes      | at most `media.max_upload_bytes`             |
//! | `media_type` | no       | `image`/`video`/`document`, else from MIME   |
//! | `alt_text`   | no       |                                              |
//! | `caption`    | no       |                                              |
//! | `is_primary` | no       | `true` makes an image the primary image      |
//!
//! The file is written before the row; a failed insert removes it again.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use stockroom_core::input::{MediaPatch, NewMedia};
use stockroom_core::{Media, MediaType};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiMultipart, ApiQuery};
use crate::response::ApiResponse;
use crate::SharedState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MediaQuery {
    pub media_type: Option<MediaType>,
}

#[derive(Debug, Deserialize)]
pub struct SetPrimary {
    pub media_id: String,
}

#[derive(Debug, Deserialize)]
pub struct Reorder {
    pub media_ids: Vec<String>,
}

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/products/{id}/media", get(list).post(create))
        .route("/api/products/{id}/media/primary", put(set_primary))
        .route("/api/products/{id}/media/order", put(reorder))
        .route("/api/media/{id}", get(show).put(update).delete(destroy))
}

async fn list(
    State(state): State<SharedState>,
    Path(product_id): Path<String>,
    ApiQuery(query): ApiQuery<MediaQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Media>>>> {
    if !state.db.products().exists(&product_id).await? {
        return Err(ApiError::not_found(format!("Product not found: {product_id}")));
    }
    let media = state
        .db
        .media()
        .list_for_product(&product_id, query.media_type)
        .await?;
    Ok(ApiResponse::ok(media))
}

/// Fields collected from an upload form.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<Bytes>,
    file_name: Option<String>,
    mime_type: Option<String>,
    media_type: Option<String>,
    alt_text: Option<String>,
    caption: Option<String>,
    is_primary: bool,
}

impl UploadForm {
    /// The declared type, or one guessed from the file's MIME type.
    fn media_type(&self) -> ApiResult<MediaType> {
        if let Some(declared) = self.media_type.as_deref().filter(|t| !t.is_empty()) {
            return Ok(declared.parse::<MediaType>()?);
        }
        Ok(match self.mime_type.as_deref() {
            Some(mime) if mime.starts_with("image/") => MediaType::Image,
            Some(mime) if mime.starts_with("video/") => MediaType::Video,
            _ => MediaType::Document,
        })
    }
}

async fn create(
    State(state): State<SharedState>,
    Path(product_id): Path<String>,
    ApiMultipart(mut multipart): ApiMultipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<Media>>)> {
    if !state.db.products().exists(&product_id).await? {
        return Err(ApiError::not_found(format!("Product not found: {product_id}")));
    }

    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                form.file_name = field.file_name().map(str::to_string);
                form.mime_type = field.content_type().map(str::to_string);
                form.file = Some(field.bytes().await?);
            }
            "media_type" => form.media_type = Some(field.text().await?),
            "alt_text" => form.alt_text = Some(field.text().await?).filter(|t| !t.is_empty()),
            "caption" => form.caption = Some(field.text().await?).filter(|t| !t.is_empty()),
            "is_primary" => form.is_primary = matches!(field.text().await?.as_str(), "true" | "1"),
            _ => {}
        }
    }

    let max = state.config.media.max_upload_bytes;
    let bytes = match form.file.take() {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Err(ApiError::bad_request("No file provided")),
    };
    if bytes.len() > max {
        return Err(ApiError::bad_request(format!("File too large (max {max} bytes)")));
    }
    let media_type = form.media_type()?;

    let original_name = form.file_name.clone().unwrap_or_else(|| "upload".to_string());
    let file_path = state.storage.save(&product_id, &original_name, &bytes).await?;
    let input = NewMedia {
        file_name: original_name,
        file_path: file_path.clone(),
        media_type,
        mime_type: form.mime_type,
        file_size_bytes: bytes.len() as i64,
        alt_text: form.alt_text,
        caption: form.caption,
    };
    let url = state.storage.url_for(&file_path);

    match state.db.media().create(&product_id, input, url, form.is_primary).await {
        Ok(media) => Ok(ApiResponse::created(media, "Media uploaded successfully")),
        Err(e) => {
            warn!(file_path = %file_path, error = %e, "Media insert failed, removing stored file");
            state.storage.remove(&file_path).await;
            Err(e.into())
        }
    }
}

async fn set_primary(
    State(state): State<SharedState>,
    Path(product_id): Path<String>,
    ApiJson(body): ApiJson<SetPrimary>,
) -> ApiResult<Json<ApiResponse<Media>>> {
    let media = state.db.media().set_primary(&product_id, &body.media_id).await?;
    Ok(ApiResponse::with_message(media, "Primary image updated"))
}

async fn reorder(
    State(state): State<SharedState>,
    Path(product_id): Path<String>,
    ApiJson(body): ApiJson<Reorder>,
) -> ApiResult<Json<ApiResponse<Vec<Media>>>> {
    let media = state.db.media().reorder(&product_id, &body.media_ids).await?;
    Ok(ApiResponse::with_message(media, "Media order updated"))
}

async fn show(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Media>>> {
    let media = state.db.media().get_by_id(&id).await?;
    Ok(ApiResponse::ok(media))
}

async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<MediaPatch>,
) -> ApiResult<Json<ApiResponse<Media>>> {
    let repo = state.db.media();
    let mut media = repo.get_by_id(&id).await?;
    media.apply(patch, Utc::now());
    repo.update(&media).await?;
    Ok(ApiResponse::with_message(media, "Media updated successfully"))
}

/// Removes the stored file, then the row.
async fn destroy(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let repo = state.db.media();
    let media = repo.get_by_id(&id).await?;
    state.storage.remove(&media.file_path).await;
    repo.delete(&id).await?;

    info!(id = %id, product_id = %media.product_id, "Media deleted via API");
    Ok(ApiResponse::message("Media deleted successfully"))
}
