//! Photo, category and settings operations over the metadata document.
//!
//! Every mutation is read-modify-write of the whole document with no locking:
//! two concurrent writers race and the last `put` wins.

use super::models::{DebugInfo, MetadataDocument, Photo, PhotoPatch, PhotoSettingsPatch};
use super::object_store::StoreError;
use super::repository::MetadataRepository;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Any combination of edits applied by a single update call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpdate {
    pub photo: Option<PhotoPatch>,
    pub settings: Option<PhotoSettingsPatch>,
    pub categories: Option<Vec<String>>,
    pub add_category: Option<String>,
    pub delete_category: Option<String>,
}

pub struct PhotoGateway {
    repository: Arc<dyn MetadataRepository>,
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn dedup_preserving_order(categories: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(categories.len());
    for c in categories {
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

impl PhotoGateway {
    pub fn new(repository: Arc<dyn MetadataRepository>) -> Self {
        Self { repository }
    }

    pub fn location(&self) -> (String, String) {
        self.repository.location()
    }

    /// Current document. Never fails: on any error a fresh document is returned
    /// with the failure described in `debug`.
    pub async fn read(&self) -> MetadataDocument {
        match self.repository.get().await {
            Ok(document) => document,
            Err(err) => {
                let (bucket, key) = self.repository.location();
                warn!(bucket = %bucket, key = %key, error = %err, "Serving empty metadata document");
                MetadataDocument {
                    debug: Some(DebugInfo {
                        error: err.to_string(),
                        bucket,
                        key,
                    }),
                    ..MetadataDocument::default()
                }
            }
        }
    }

    /// Document to base a write on. A missing document starts fresh; any other
    /// failure aborts so an unreadable document is never overwritten.
    async fn load_for_write(&self) -> Result<MetadataDocument, StoreError> {
        match self.repository.get().await {
            Ok(document) => Ok(document),
            Err(err) if err.is_not_found() => {
                info!("No metadata document yet, starting a new one");
                Ok(MetadataDocument::default())
            }
            Err(err) => Err(err),
        }
    }

    async fn save(&self, mut document: MetadataDocument) -> Result<MetadataDocument, GatewayError> {
        document.updated_at = Some(timestamp());
        document.debug = None;
        self.repository.put(&document).await?;
        Ok(document)
    }

    /// Prepends `photo`, assigning an id when it has none and registering a new category.
    pub async fn create(&self, mut photo: Photo) -> Result<MetadataDocument, GatewayError> {
        if photo.url.trim().is_empty() || photo.title.trim().is_empty() {
            return Err(GatewayError::Validation(
                "Photo url and title are required".to_string(),
            ));
        }
        if photo.id.is_empty() {
            photo.id = uuid::Uuid::new_v4().to_string();
        }

        let mut document = self.load_for_write().await?;
        let category = photo.category.clone();
        info!("Adding photo {} ({:?})", photo.id, photo.title);
        document.photos.insert(0, photo);
        document.add_category(&category);
        self.save(document).await
    }

    /// Applies, in order: photo patch, category add, category delete, category list
    /// replacement, settings merge.
    ///
    /// Deleting a category leaves photos that use it untouched.
    pub async fn update(&self, update: DocumentUpdate) -> Result<MetadataDocument, GatewayError> {
        let mut document = self.load_for_write().await?;

        if let Some(patch) = &update.photo {
            match document.photos.iter_mut().find(|p| p.id == patch.id) {
                Some(photo) => photo.apply(patch),
                None => warn!("Photo patch for unknown id {:?} ignored", patch.id),
            }
        }

        if let Some(category) = &update.add_category {
            document.add_category(category);
        }

        if let Some(category) = &update.delete_category {
            document.categories.retain(|c| c != category);
            let orphans = document.orphaned_photos().len();
            if orphans > 0 {
                info!("Deleted category {:?}, {} photos still reference it", category, orphans);
            }
        }

        if let Some(categories) = update.categories {
            document.categories = dedup_preserving_order(categories);
        }

        if let Some(settings) = update.settings {
            document.settings.merge(settings);
        }

        self.save(document).await
    }

    /// Removes the photo with `id`. Hero photo entries pointing at it are left in place.
    pub async fn delete(&self, id: &str) -> Result<MetadataDocument, GatewayError> {
        if id.is_empty() {
            return Err(GatewayError::Validation("Photo id required".to_string()));
        }

        let mut document = self.load_for_write().await?;
        let before = document.photos.len();
        document.photos.retain(|p| p.id != id);
        info!("Deleted photo {} ({} removed)", id, before - document.photos.len());

        for (category, url) in document.dangling_hero_photos() {
            warn!("Hero photo for {:?} points at missing photo {}", category, url);
        }
        self.save(document).await
    }
}
