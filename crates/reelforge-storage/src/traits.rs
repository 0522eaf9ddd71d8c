//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement. The pipeline and the feed depend only on this trait, which
//! allows swapping the real object store for test doubles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelforge_core::StorageBackend;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("Presign failed: {0}")]
    PresignFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Metadata for one listed object.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// One page of an object listing.
///
/// `next_cursor` is the opaque continuation token for the page after this
/// one: pass it back to `list_page` to resume strictly after the last
/// returned key. `None` means the listing is exhausted.
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub objects: Vec<StoredObject>,
    pub next_cursor: Option<String>,
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem, in-memory) must implement
/// this trait.
#[async_trait]
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Upload an object under the given key and return its public URL.
    async fn upload(&self, key: &str, content_type: &str, data: Vec<u8>)
        -> StorageResult<String>;

    /// Download an object by its storage key.
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete an object by its storage key.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Generate a presigned/temporary URL for direct read access.
    ///
    /// This gives clients time-limited access to one object without going
    /// through the application server.
    async fn get_presigned_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// List up to `limit` objects under `prefix`, lexicographically ordered,
    /// resuming strictly after `cursor` when one is given.
    ///
    /// A fixed cursor against an unchanged store must return the same page
    /// and the same `next_cursor` on every call.
    async fn list_page(
        &self,
        prefix: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> StorageResult<ObjectPage>;

    /// Check if an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get the storage backend type.
    fn backend_type(&self) -> StorageBackend;
}

/// Reject keys that could escape the bucket namespace.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
