//! Image-to-video synthesis via the Runway tasks API.
//!
//! The provider is asynchronous: a submission returns a task id, and the
//! client polls task status on a fixed interval until a terminal state. The
//! poll loop is bounded: exhausting the attempt budget surfaces a timeout
//! instead of blocking the job forever.

use async_trait::async_trait;
use reelforge_core::config::ProviderConfig;
use reelforge_core::AppError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PollTimeout, SynthesisError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const RUNWAY_VERSION: &str = "2024-11-06";

/// A synthesized video with no audio track, referenced by provider URL.
#[derive(Debug, Clone, PartialEq)]
pub struct SilentVideo {
    pub url: String,
}

/// Capability: turn a set of still images into a silent vertical video.
#[async_trait]
pub trait VideoSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        images: &[String],
        prompt_text: &str,
    ) -> Result<SilentVideo, SynthesisError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageToVideoRequest {
    model: String,
    prompt_image: String,
    prompt_text: String,
    ratio: String,
}

#[derive(Debug, Deserialize)]
struct TaskCreated {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TaskStatus {
    status: String,
    #[serde(default)]
    output: Option<Vec<String>>,
    #[serde(default)]
    failure: Option<String>,
}

/// Video synthesizer backed by Runway's image-to-video tasks API.
pub struct RunwayVideoSynthesizer {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    ratio: String,
    poll_interval: Duration,
    max_attempts: u32,
}

impl RunwayVideoSynthesizer {
    pub fn from_config(config: &ProviderConfig) -> Result<Self, AppError> {
        let api_key = config
            .runway_api_key
            .clone()
            .ok_or_else(|| AppError::Config("RUNWAY_API_KEY not configured".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: config.runway_base_url.trim_end_matches('/').to_string(),
            model: config.runway_model.clone(),
            ratio: config.runway_ratio.clone(),
            poll_interval: Duration::from_secs(config.video_poll_interval_secs),
            max_attempts: config.video_poll_max_attempts,
        })
    }

    /// Submit the generation task and return its id.
    async fn submit(&self, prompt_image: &str, prompt_text: &str) -> Result<String, SynthesisError> {
        let body = ImageToVideoRequest {
            model: self.model.clone(),
            prompt_image: prompt_image.to_string(),
            prompt_text: prompt_text.to_string(),
            ratio: self.ratio.clone(),
        };

        let response = self
            .http_client
            .post(format!("{}/v1/image_to_video", self.base_url))
            .bearer_auth(&self.api_key)
            .header("X-Runway-Version", RUNWAY_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SynthesisError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let created: TaskCreated = response.json().await?;
        Ok(created.id)
    }

    /// Fetch the current status of a task.
    async fn poll_status(&self, task_id: &str) -> Result<TaskStatus, SynthesisError> {
        let response = self
            .http_client
            .get(format!("{}/v1/tasks/{}", self.base_url, task_id))
            .bearer_auth(&self.api_key)
            .header("X-Runway-Version", RUNWAY_VERSION)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SynthesisError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl VideoSynthesizer for RunwayVideoSynthesizer {
    #[tracing::instrument(skip(self, images, prompt_text), fields(model = %self.model, image_count = images.len()))]
    async fn synthesize(
        &self,
        images: &[String],
        prompt_text: &str,
    ) -> Result<SilentVideo, SynthesisError> {
        // The provider takes a single conditioning frame; the first image
        // leads the reel.
        let prompt_image = images
            .first()
            .ok_or_else(|| SynthesisError::EmptyInput("images".to_string()))?;

        let task_id = self.submit(prompt_image, prompt_text).await?;
        tracing::info!(task_id = %task_id, "Video generation task submitted");

        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.poll_interval).await;

            let task = self.poll_status(&task_id).await?;
            match task.status.as_str() {
                "SUCCEEDED" => {
                    let url = task
                        .output
                        .unwrap_or_default()
                        .into_iter()
                        .next()
                        .ok_or(SynthesisError::MissingOutput)?;
                    tracing::info!(task_id = %task_id, attempt, "Video generation succeeded");
                    return Ok(SilentVideo { url });
                }
                "FAILED" => {
                    let reason = task
                        .failure
                        .unwrap_or_else(|| "video generation failed".to_string());
                    tracing::error!(task_id = %task_id, reason = %reason, "Video generation failed");
                    return Err(SynthesisError::JobFailed(reason));
                }
                other => {
                    tracing::debug!(task_id = %task_id, status = %other, attempt, "Video still in progress");
                }
            }
        }

        Err(SynthesisError::Timeout(PollTimeout {
            attempts: self.max_attempts,
            waited_secs: self.max_attempts as u64 * self.poll_interval.as_secs(),
        }))
    }
}
