use super::models::MetadataDocument;
use super::object_store::{ObjectStore, StoreError};
use crate::server::metrics::record_document_op;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

pub const METADATA_CONTENT_TYPE: &str = "application/json";

/// Whole-document persistence for the metadata aggregate.
///
/// `put` is an unconditional overwrite. An implementation adding a version check
/// can be dropped in here without touching the gateway.
#[async_trait]
pub trait MetadataRepository: Send + Sync {
    async fn get(&self) -> Result<MetadataDocument, StoreError>;

    async fn put(&self, document: &MetadataDocument) -> Result<(), StoreError>;

    /// Bucket (or store root) and key, as reported in diagnostics.
    fn location(&self) -> (String, String);
}

/// Keeps the document as pretty-printed JSON at a fixed key of an object store.
pub struct ObjectMetadataRepository {
    store: Arc<dyn ObjectStore>,
    key: String,
}

impl ObjectMetadataRepository {
    pub fn new(store: Arc<dyn ObjectStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }
}

#[async_trait]
impl MetadataRepository for ObjectMetadataRepository {
    async fn get(&self) -> Result<MetadataDocument, StoreError> {
        let bytes = match self.store.get(&self.key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                record_document_op("read", if e.is_not_found() { "missing" } else { "error" });
                return Err(e);
            }
        };
        let document: MetadataDocument = serde_json::from_slice(&bytes).inspect_err(|_| {
            record_document_op("read", "corrupt");
        })?;
        debug!(
            "Loaded metadata document: {} photos, {} categories",
            document.photos.len(),
            document.categories.len()
        );
        record_document_op("read", "ok");
        Ok(document)
    }

    async fn put(&self, document: &MetadataDocument) -> Result<(), StoreError> {
        let mut persisted = document.clone();
        persisted.debug = None;
        let body = serde_json::to_vec_pretty(&persisted)?;

        let result = self
            .store
            .put(&self.key, body, METADATA_CONTENT_TYPE)
            .await;
        record_document_op("write", if result.is_ok() { "ok" } else { "error" });
        result?;

        info!(
            "Wrote metadata document: {} photos, categories {:?}",
            persisted.photos.len(),
            persisted.categories
        );
        Ok(())
    }

    fn location(&self) -> (String, String) {
        (self.store.location(), self.key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo_store::{DebugInfo, MemoryStore};

    #[tokio::test]
    async fn writes_pretty_json_without_debug() {
        let store = Arc::new(MemoryStore::new());
        let repo = ObjectMetadataRepository::new(store.clone(), "photos/photos.json");

        let mut doc = MetadataDocument::default();
        doc.debug = Some(DebugInfo {
            error: "x".to_string(),
            bucket: "b".to_string(),
            key: "k".to_string(),
        });
        repo.put(&doc).await.unwrap();

        let stored = store.object("photos/photos.json").unwrap();
        assert_eq!(stored.content_type, "application/json");
        let text = String::from_utf8(stored.body).unwrap();
        assert!(text.contains("\n  \"photos\""));
        assert!(!text.contains("debug"));

        let loaded = repo.get().await.unwrap();
        assert!(loaded.debug.is_none());
        assert_eq!(repo.location(), ("memory".to_string(), "photos/photos.json".to_string()));
    }

    #[tokio::test]
    async fn corrupt_document_is_a_codec_error() {
        let store = Arc::new(MemoryStore::new());
        store.put("k", b"{not json".to_vec(), "application/json").await.unwrap();
        let repo = ObjectMetadataRepository::new(store, "k");
        assert!(matches!(repo.get().await, Err(StoreError::Codec(_))));
    }
}
