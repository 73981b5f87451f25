//! Photo metadata persistence: a single JSON document in an object store.

mod fs;
mod gateway;
mod memory;
mod models;
mod object_store;
mod repository;
mod s3;
pub mod sigv4;

pub use fs::FsStore;
pub use gateway::{DocumentUpdate, GatewayError, PhotoGateway};
pub use memory::{MemoryStore, StoredObject};
pub use models::{
    default_categories, DebugInfo, MetadataDocument, Photo, PhotoPatch, PhotoSettings,
    PhotoSettingsPatch,
    DEFAULT_CATEGORIES,
};
pub use object_store::{ObjectStore, StoreError};
pub use repository::{MetadataRepository, ObjectMetadataRepository, METADATA_CONTENT_TYPE};
pub use s3::{S3Config, S3Store};
