//! Token exchange and image upload routes.
//!
//! - POST /api/auth/token `{ password }`
//! - POST /api/upload (raw image body, `x-file-name` header)
//! - POST /api/upload/presigned `{ fileName, fileType }`

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, HeaderMap},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::errors::ApiError;
use super::photo_routes::json_body;
use super::session::UploadWriter;
use super::state::{OptionalUploadService, ServerState};
use crate::auth::Credentials;
use crate::upload::{PresignedUpload, UploadReceipt, UploadService};

pub const HEADER_FILE_NAME: &str = "x-file-name";

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequestBody {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
    pub expires_in: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignBody {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

fn uploads(service: &OptionalUploadService) -> Result<&UploadService, ApiError> {
    service
        .as_deref()
        .ok_or_else(ApiError::storage_not_configured)
}

async fn post_token(
    State(credentials): State<Credentials>,
    body: Result<Json<TokenRequestBody>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let body = json_body(body)?;
    let issued = credentials.issue_token(body.password.as_deref())?;
    info!("Issued upload token");
    Ok(Json(TokenResponse {
        success: true,
        token: issued.token,
        expires_in: issued.expires_in,
    }))
}

async fn post_upload(
    _writer: UploadWriter,
    State(service): State<OptionalUploadService>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadReceipt>, ApiError> {
    let service = uploads(&service)?;
    let file_name = headers.get(HEADER_FILE_NAME).and_then(|v| v.to_str().ok());
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let receipt = service
        .upload(file_name, content_type, body.to_vec())
        .await?;
    Ok(Json(receipt))
}

async fn post_presigned(
    _writer: UploadWriter,
    State(service): State<OptionalUploadService>,
    body: Result<Json<PresignBody>, JsonRejection>,
) -> Result<Json<PresignedUpload>, ApiError> {
    let service = uploads(&service)?;
    let body = json_body(body)?;
    Ok(Json(service.presign(
        body.file_name.as_deref(),
        body.file_type.as_deref(),
    )?))
}

pub fn upload_routes(max_upload_bytes: usize) -> Router<ServerState> {
    Router::new()
        .route("/auth/token", post(post_token))
        .route(
            "/upload",
            post(post_upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/upload/presigned", post(post_presigned))
}
