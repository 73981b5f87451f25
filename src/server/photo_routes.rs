//! Photo metadata routes.
//!
//! - GET /api/photos (public)
//! - POST /api/photos `{ photo }`
//! - PUT /api/photos `{ photo?, settings?, categories?, addCategory?, deleteCategory? }`
//! - DELETE /api/photos `{ id }`
//!
//! Writes require `Authorization: Bearer <password or token>` and are checked
//! before the body is read or storage is touched.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::errors::ApiError;
use super::session::PhotoWriter;
use super::state::{OptionalPhotoGateway, ServerState};
use crate::config::StorageReport;
use crate::photo_store::{DebugInfo, DocumentUpdate, MetadataDocument, Photo, PhotoGateway};

#[derive(Debug, Deserialize)]
pub struct CreatePhotoBody {
    #[serde(default)]
    pub photo: Option<Photo>,
}

#[derive(Debug, Deserialize)]
pub struct DeletePhotoBody {
    #[serde(default)]
    pub id: Option<String>,
}

/// Unwraps a JSON body, turning any rejection into a 400 `{error}`.
pub(super) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(format!("Invalid JSON body: {}", rejection.body_text())))
}

fn gateway(photos: &OptionalPhotoGateway) -> Result<&PhotoGateway, ApiError> {
    photos
        .as_deref()
        .ok_or_else(ApiError::storage_not_configured)
}

async fn get_photos(
    State(photos): State<OptionalPhotoGateway>,
    State(report): State<StorageReport>,
) -> Json<MetadataDocument> {
    match photos.as_deref() {
        Some(gateway) => Json(gateway.read().await),
        None => Json(MetadataDocument {
            debug: Some(DebugInfo {
                error: "Storage not configured".to_string(),
                bucket: report.bucket,
                key: report.metadata_key,
            }),
            ..MetadataDocument::default()
        }),
    }
}

async fn post_photo(
    _writer: PhotoWriter,
    State(photos): State<OptionalPhotoGateway>,
    body: Result<Json<CreatePhotoBody>, JsonRejection>,
) -> Result<Json<MetadataDocument>, ApiError> {
    let gateway = gateway(&photos)?;
    let photo = json_body(body)?.photo.unwrap_or_default();
    Ok(Json(gateway.create(photo).await?))
}

async fn put_photos(
    _writer: PhotoWriter,
    State(photos): State<OptionalPhotoGateway>,
    body: Result<Json<DocumentUpdate>, JsonRejection>,
) -> Result<Json<MetadataDocument>, ApiError> {
    let gateway = gateway(&photos)?;
    let update = json_body(body)?;
    Ok(Json(gateway.update(update).await?))
}

async fn delete_photo(
    _writer: PhotoWriter,
    State(photos): State<OptionalPhotoGateway>,
    body: Result<Json<DeletePhotoBody>, JsonRejection>,
) -> Result<Json<MetadataDocument>, ApiError> {
    let gateway = gateway(&photos)?;
    let id = json_body(body)?.id.unwrap_or_default();
    Ok(Json(gateway.delete(&id).await?))
}

pub fn photo_routes() -> Router<ServerState> {
    Router::new().route(
        "/photos",
        get(get_photos)
            .post(post_photo)
            .put(put_photos)
            .delete(delete_photo),
    )
}
