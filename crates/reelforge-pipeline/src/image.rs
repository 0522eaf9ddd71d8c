//! Still-image generation for the reel's visual track.
//!
//! Each usable generation result is persisted individually and exchanged for
//! a medium-duration presigned URL; downstream consumers receive URLs only.
//! Partial results are accepted; consumers must tolerate fewer images than
//! requested.

use async_trait::async_trait;
use base64::Engine as _;
use reelforge_core::config::ProviderConfig;
use reelforge_core::AppError;
use reelforge_storage::{keys, Storage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::GenerationError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const IMAGE_CONTENT_TYPE: &str = "image/png";

/// Capability: produce presigned URLs for freshly generated still images.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_images(&self, subject: &str) -> Result<Vec<String>, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ImagesRequest {
    model: String,
    prompt: String,
    n: usize,
    size: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    #[serde(default)]
    b64_json: Option<String>,
}

/// Image generator backed by the OpenAI images endpoint.
pub struct OpenAiImageGenerator {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    image_count: usize,
    image_size: String,
    url_expiry: Duration,
    storage: Arc<dyn Storage>,
}

impl OpenAiImageGenerator {
    pub fn from_config(
        config: &ProviderConfig,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, AppError> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| AppError::Config("OPENAI_API_KEY not configured".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.image_model.clone(),
            image_count: config.image_count,
            image_size: config.image_size.clone(),
            url_expiry: Duration::from_secs(config.image_url_expiry_secs),
            storage,
        })
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    #[tracing::instrument(skip(self), fields(subject = %subject, model = %self.model))]
    async fn generate_images(&self, subject: &str) -> Result<Vec<String>, GenerationError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(GenerationError::EmptySubject);
        }

        let body = ImagesRequest {
            model: self.model.clone(),
            prompt: subject.to_string(),
            n: self.image_count,
            size: self.image_size.clone(),
        };

        let response = self
            .http_client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ImagesResponse = response.json().await?;

        // Only results with an actual payload survive; a short set is fine.
        let mut urls = Vec::new();
        for datum in parsed.data {
            let Some(b64) = datum.b64_json else {
                continue;
            };
            let bytes = match base64::engine::general_purpose::STANDARD.decode(&b64) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping image with undecodable payload");
                    continue;
                }
            };

            let key = keys::image_key();
            self.storage.upload(&key, IMAGE_CONTENT_TYPE, bytes).await?;
            let url = self.storage.get_presigned_url(&key, self.url_expiry).await?;
            urls.push(url);
        }

        if urls.is_empty() {
            return Err(GenerationError::NoUsableImages);
        }

        tracing::info!(
            requested = self.image_count,
            produced = urls.len(),
            "Images generated and persisted"
        );

        Ok(urls)
    }
}
