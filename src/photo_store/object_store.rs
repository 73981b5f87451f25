use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Storage request failed: {0}")]
    Transport(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid metadata document: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Operation not supported by this store: {0}")]
    Unsupported(&'static str),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Minimal object-store surface: whole-object get/put plus pre-signed uploads.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError>;

    /// URL a client can PUT the object to directly, valid for `expires_in`.
    fn presign_put(&self, key: &str, expires_in: Duration) -> Result<String, StoreError>;

    /// Direct (non-CDN) URL of an object, when the store has one.
    fn object_url(&self, key: &str) -> Option<String>;

    /// Bucket or root this store writes into, for diagnostics.
    fn location(&self) -> String;
}
