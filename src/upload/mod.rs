//! Image uploads, either through this server or straight to the store via a pre-signed URL.

mod naming;

pub use naming::{decode_file_name, object_key, public_url, sanitize_file_name, DEFAULT_FILE_NAME};

use crate::photo_store::{ObjectStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_UPLOAD_PREFIX: &str = "photos";
pub const PRESIGNED_URL_EXPIRY: Duration = Duration::from_secs(3600);
const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only image files are allowed")]
    NotImage,

    #[error("Missing required fields: fileName, fileType")]
    MissingFields,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub success: bool,
    pub filename: String,
    pub path: String,
    pub url: String,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    pub success: bool,
    pub presigned_url: String,
    pub public_url: String,
    pub filename: String,
    pub key: String,
}

pub struct UploadService {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    public_base_url: Option<String>,
}

impl UploadService {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: String, public_base_url: Option<String>) -> Self {
        Self {
            store,
            prefix,
            public_base_url,
        }
    }

    fn url_for(&self, key: &str) -> String {
        public_url(
            self.public_base_url.as_deref(),
            self.store.object_url(key),
            key,
        )
    }

    /// Stores `body` under a timestamped key derived from the (encoded) file name header.
    pub async fn upload(
        &self,
        encoded_file_name: Option<&str>,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> Result<UploadReceipt, UploadError> {
        let content_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE);
        if !content_type.starts_with("image/") {
            return Err(UploadError::NotImage);
        }

        let file_name = decode_file_name(encoded_file_name);
        let (filename, key) = object_key(
            &self.prefix,
            &file_name,
            chrono::Utc::now().timestamp_millis(),
        );
        let size = body.len();

        info!("Uploading {} ({} bytes, {})", key, size, content_type);
        self.store.put(&key, body, content_type).await?;

        Ok(UploadReceipt {
            success: true,
            url: self.url_for(&key),
            filename,
            path: key,
            size,
        })
    }

    /// Issues a pre-signed PUT URL so the client can upload without going through this server.
    pub fn presign(
        &self,
        file_name: Option<&str>,
        file_type: Option<&str>,
    ) -> Result<PresignedUpload, UploadError> {
        let (Some(file_name), Some(_)) = (
            file_name.filter(|n| !n.is_empty()),
            file_type.filter(|t| !t.is_empty()),
        ) else {
            return Err(UploadError::MissingFields);
        };

        let (filename, key) = object_key(
            &self.prefix,
            file_name,
            chrono::Utc::now().timestamp_millis(),
        );
        let presigned_url = self.store.presign_put(&key, PRESIGNED_URL_EXPIRY)?;

        Ok(PresignedUpload {
            success: true,
            presigned_url,
            public_url: self.url_for(&key),
            filename,
            key,
        })
    }
}
