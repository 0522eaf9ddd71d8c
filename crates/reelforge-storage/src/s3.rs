use crate::traits::{validate_key, ObjectPage, Storage, StorageError, StorageResult, StoredObject};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStore, ObjectStoreExt, PutPayload, Result as ObjectResult};
use reelforge_core::StorageBackend;
use std::time::Duration;

/// S3 storage implementation
#[derive(Clone, Debug)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Build AmazonS3 object store from environment and explicit settings.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Generate public URL for an S3 object
    fn generate_url(&self, key: &str) -> String {
        format_object_url(&self.bucket, &self.region, self.endpoint_url.as_deref(), key)
    }
}

/// Public URL for an S3 object.
///
/// For AWS S3, uses the standard virtual-hosted format; for S3-compatible
/// providers, path-style addressing against the configured endpoint.
fn format_object_url(bucket: &str, region: &str, endpoint_url: Option<&str>, key: &str) -> String {
    if let Some(endpoint) = endpoint_url {
        let base_url = endpoint.trim_end_matches('/');
        format!("{}/{}/{}", base_url, bucket, key)
    } else {
        format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(
        &self,
        key: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        validate_key(key)?;
        let size = data.len() as u64;
        let bytes = Bytes::from(data);
        let location = Path::from(key.to_string());

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(bytes)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let url = self.generate_url(key);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(url)
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        validate_key(key)?;
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes.to_vec())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(bucket = %self.bucket, key = %key, "S3 delete successful");

        Ok(())
    }

    async fn get_presigned_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        validate_key(key)?;
        let location = Path::from(key.to_string());
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?
            .to_string();

        Ok(url)
    }

    async fn list_page(
        &self,
        prefix: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> StorageResult<ObjectPage> {
        let start = std::time::Instant::now();
        let prefix_path = Path::from(prefix.to_string());
        let offset_path = cursor.map(|c| Path::from(c.to_string()));

        // Fetch one extra entry to know whether another page exists.
        let mut stream = match offset_path.as_ref() {
            Some(offset) => self.store.list_with_offset(Some(&prefix_path), offset),
            None => self.store.list(Some(&prefix_path)),
        };

        let mut objects: Vec<StoredObject> = Vec::with_capacity(limit + 1);
        while objects.len() <= limit {
            match stream.next().await {
                Some(Ok(meta)) => objects.push(StoredObject {
                    key: meta.location.to_string(),
                    size: meta.size as u64,
                    last_modified: meta.last_modified,
                }),
                Some(Err(e)) => {
                    tracing::error!(
                        error = %e,
                        bucket = %self.bucket,
                        prefix = %prefix,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "S3 listing failed"
                    );
                    return Err(StorageError::ListFailed(e.to_string()));
                }
                None => break,
            }
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));

        let next_cursor = if objects.len() > limit {
            objects.truncate(limit);
            objects.last().map(|o| o.key.clone())
        } else {
            None
        };

        tracing::info!(
            bucket = %self.bucket,
            prefix = %prefix,
            returned = objects.len(),
            has_more = next_cursor.is_some(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 listing successful"
        );

        Ok(ObjectPage {
            objects,
            next_cursor,
        })
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
