//! In-memory storage backend.
//!
//! Holds objects in a process-local map. Used as the test double for the
//! gateway and for ephemeral development setups; it implements the same
//! `Storage` contract as the durable backends, including ordered cursor
//! listing.

use crate::traits::{validate_key, ObjectPage, Storage, StorageError, StorageResult, StoredObject};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelforge_core::StorageBackend;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Debug)]
struct StoredEntry {
    data: Vec<u8>,
    last_modified: DateTime<Utc>,
}

/// In-memory storage implementation
#[derive(Clone, Debug)]
pub struct MemoryStorage {
    objects: Arc<Mutex<BTreeMap<String, StoredEntry>>>,
    base_url: String,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: Arc::new(Mutex::new(BTreeMap::new())),
            base_url: base_url.into(),
        }
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Number of stored objects, for assertions in tests.
    pub fn object_count(&self) -> usize {
        self.objects.lock().expect("storage map poisoned").len()
    }

    /// Keys currently stored under the given prefix, in order.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.objects
            .lock()
            .expect("storage map poisoned")
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("memory://bucket")
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload(
        &self,
        key: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        validate_key(key)?;
        let mut objects = self.objects.lock().expect("storage map poisoned");
        objects.insert(
            key.to_string(),
            StoredEntry {
                data,
                last_modified: Utc::now(),
            },
        );
        Ok(self.generate_url(key))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        validate_key(key)?;
        let objects = self.objects.lock().expect("storage map poisoned");
        objects
            .get(key)
            .map(|entry| entry.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let mut objects = self.objects.lock().expect("storage map poisoned");
        objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn get_presigned_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        validate_key(key)?;
        let objects = self.objects.lock().expect("storage map poisoned");
        if !objects.contains_key(key) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(format!(
            "{}?expires={}",
            self.generate_url(key),
            expires_in.as_secs()
        ))
    }

    async fn list_page(
        &self,
        prefix: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> StorageResult<ObjectPage> {
        let objects = self.objects.lock().expect("storage map poisoned");
        let mut page = Vec::new();
        let mut next_cursor = None;
        for (key, entry) in objects
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .filter(|(k, _)| cursor.map_or(true, |c| k.as_str() > c))
        {
            if page.len() == limit {
                next_cursor = page.last().map(|o: &StoredObject| o.key.clone());
                break;
            }
            page.push(StoredObject {
                key: key.clone(),
                size: entry.data.len() as u64,
                last_modified: entry.last_modified,
            });
        }

        Ok(ObjectPage {
            objects: page,
            next_cursor,
        })
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        let objects = self.objects.lock().expect("storage map poisoned");
        Ok(objects.contains_key(key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
