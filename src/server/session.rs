//! Request extractors that gate writes behind the upload credentials.

use super::state::ServerState;
use crate::auth::AuthError;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

pub const HEADER_UPLOAD_TOKEN: &str = "x-upload-token";
pub const HEADER_UPLOAD_PASSWORD: &str = "x-upload-password";

fn header_value<'a>(parts: &'a Parts, name: impl header::AsHeaderName) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

/// Caller presented `Authorization: Bearer <password or token>`.
#[derive(Debug)]
pub struct PhotoWriter;

impl FromRequestParts<ServerState> for PhotoWriter {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        ctx.credentials
            .check_bearer(header_value(parts, header::AUTHORIZATION))
            .map(|_| PhotoWriter)
            .inspect_err(|err| debug!("Photo write rejected: {}", err))
    }
}

/// Caller presented `x-upload-token` or `x-upload-password`.
#[derive(Debug)]
pub struct UploadWriter;

impl FromRequestParts<ServerState> for UploadWriter {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        ctx.credentials
            .check_upload_headers(
                header_value(parts, HEADER_UPLOAD_TOKEN),
                header_value(parts, HEADER_UPLOAD_PASSWORD),
            )
            .map(|_| UploadWriter)
            .inspect_err(|err| debug!("Upload rejected: {}", err))
    }
}
