use crate::traits::{validate_key, ObjectPage, Storage, StorageError, StorageResult, StoredObject};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelforge_core::StorageBackend;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/reelforge/objects")
    /// * `base_url` - Base URL for serving objects (e.g., "http://localhost:3000/objects")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }

    /// Generate public URL for an object
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Collect every object key under `prefix`, relative to the base path.
    async fn collect_keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let root = self.base_path.join(prefix.trim_end_matches('/'));
        if fs::metadata(&root).await.is_err() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        let mut pending = vec![root];
        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir)
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| StorageError::ListFailed(e.to_string()))?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.base_path) {
                    keys.push(relative.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        Ok(keys)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        fs::write(&path, &data).await.map_err(|e| {
            tracing::error!(error = %e, key = %key, "Local upload failed");
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(key = %key, size_bytes = data.len() as u64, "Local upload successful");

        Ok(self.generate_url(key))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(e.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }

    async fn get_presigned_url(&self, key: &str, _expires_in: Duration) -> StorageResult<String> {
        // The local backend has no credential-embedding URLs; serve the
        // plain file URL instead.
        let path = self.key_to_path(key)?;
        if fs::metadata(&path).await.is_err() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(self.generate_url(key))
    }

    async fn list_page(
        &self,
        prefix: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> StorageResult<ObjectPage> {
        let mut keys = self.collect_keys(prefix).await?;
        keys.sort();

        let mut objects = Vec::new();
        let mut next_cursor = None;
        for key in keys
            .into_iter()
            .filter(|k| cursor.map_or(true, |c| k.as_str() > c))
        {
            if objects.len() == limit {
                next_cursor = objects.last().map(|o: &StoredObject| o.key.clone());
                break;
            }
            let path = self.base_path.join(&key);
            let metadata = fs::metadata(&path)
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;
            let last_modified: DateTime<Utc> = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            objects.push(StoredObject {
                key,
                size: metadata.len(),
                last_modified,
            });
        }

        Ok(ObjectPage {
            objects,
            next_cursor,
        })
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::metadata(&path).await.is_ok())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
