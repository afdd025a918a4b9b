//! Blob storage for uploaded images.
//!
//! Handlers only see the [`MediaStore`] trait; the server wires in a
//! [`LocalMediaStore`] and tests are free to substitute their own.

mod local;

pub use local::LocalMediaStore;

use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid object name '{0}'")]
    InvalidName(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt object metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct StoredMedia {
    /// Object name inside the store, `{uuid}-{filename}`.
    pub name: String,
    /// Public URL the object can be fetched from.
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct MediaObject {
    pub bytes: Bytes,
    pub content_type: String,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Write `bytes` under a fresh collision-resistant name derived from
    /// `suggested_name`, remembering `content_type`.
    async fn upload(
        &self,
        bytes: Bytes,
        content_type: &str,
        suggested_name: &str,
    ) -> Result<StoredMedia, StorageError>;

    async fn fetch(&self, name: &str) -> Result<Option<MediaObject>, StorageError>;

    /// Remove an object. Deleting something already gone is not an error.
    async fn delete(&self, name: &str) -> Result<(), StorageError>;
}
