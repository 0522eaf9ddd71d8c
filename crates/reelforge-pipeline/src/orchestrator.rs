//! End-to-end reel generation.
//!
//! One orchestrator invocation is one job: script, narration, images, silent
//! video, audio merge, upload. Steps run strictly in sequence; every step
//! failure is fatal to the job except a recoverable merge failure, where the
//! job continues with the silent video unmodified. Each job writes a freshly
//! generated key, so concurrent jobs never contend on shared state.

use chrono::Utc;
use reelforge_core::models::StoredReel;
use reelforge_storage::{keys, Storage, StorageError};
use std::sync::Arc;
use thiserror::Error;

use crate::error::{GenerationError, SynthesisError};
use crate::fetch;
use crate::image::ImageGenerator;
use crate::script::ScriptGenerator;
use crate::speech::SpeechSynthesizer;
use crate::transcode::{MediaTranscoder, TranscodeError};
use crate::video::{SilentVideo, VideoSynthesizer};

const REEL_CONTENT_TYPE: &str = "video/mp4";

/// A whole-job failure, tagged with the step that failed. The HTTP boundary
/// reports it as a single failure signal; logs retain the step detail.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("script generation failed: {0}")]
    Script(#[source] GenerationError),

    #[error("speech synthesis failed: {0}")]
    Speech(#[source] SynthesisError),

    #[error("image generation failed: {0}")]
    Images(#[source] GenerationError),

    #[error("video synthesis failed: {0}")]
    Video(#[source] SynthesisError),

    #[error("audio merge failed: {0}")]
    Merge(#[source] TranscodeError),

    #[error("could not fetch silent video for fallback upload: {0}")]
    Fallback(String),

    #[error("reel upload failed: {0}")]
    Storage(#[from] StorageError),
}

/// Sequences the content generators, the transcoder, and the storage
/// gateway into one generation job. All collaborators are injected.
pub struct ReelOrchestrator {
    script_generator: Arc<dyn ScriptGenerator>,
    speech_synthesizer: Arc<dyn SpeechSynthesizer>,
    image_generator: Arc<dyn ImageGenerator>,
    video_synthesizer: Arc<dyn VideoSynthesizer>,
    transcoder: Arc<dyn MediaTranscoder>,
    storage: Arc<dyn Storage>,
    http_client: reqwest::Client,
    video_prompt_text: String,
}

impl ReelOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        script_generator: Arc<dyn ScriptGenerator>,
        speech_synthesizer: Arc<dyn SpeechSynthesizer>,
        image_generator: Arc<dyn ImageGenerator>,
        video_synthesizer: Arc<dyn VideoSynthesizer>,
        transcoder: Arc<dyn MediaTranscoder>,
        storage: Arc<dyn Storage>,
        video_prompt_text: String,
    ) -> Self {
        Self {
            script_generator,
            speech_synthesizer,
            image_generator,
            video_synthesizer,
            transcoder,
            storage,
            http_client: reqwest::Client::new(),
            video_prompt_text,
        }
    }

    /// Run one generation job for the given subject. On success exactly one
    /// new reel object exists under `reels/`.
    #[tracing::instrument(skip(self), fields(subject = %subject))]
    pub async fn generate_and_upload_reel(
        &self,
        subject: &str,
    ) -> Result<StoredReel, PipelineError> {
        let script = self
            .script_generator
            .generate_script(subject)
            .await
            .map_err(PipelineError::Script)?;

        let audio = self
            .speech_synthesizer
            .synthesize(&script)
            .await
            .map_err(PipelineError::Speech)?;

        let images = self
            .image_generator
            .generate_images(subject)
            .await
            .map_err(PipelineError::Images)?;

        let silent = self
            .video_synthesizer
            .synthesize(&images, &self.video_prompt_text)
            .await
            .map_err(PipelineError::Video)?;

        let combined = match self
            .transcoder
            .merge_audio_into_video(&silent, &audio.key)
            .await
        {
            Ok(bytes) => bytes,
            Err(err) if err.is_recoverable() => {
                tracing::warn!(
                    error = %err,
                    audio_key = %audio.key,
                    "Audio merge failed, continuing with silent video"
                );
                self.silent_video_bytes(&silent).await?
            }
            Err(fatal) => return Err(PipelineError::Merge(fatal)),
        };

        let key = keys::reel_key();
        let size = combined.len() as u64;
        let url = self
            .storage
            .upload(&key, REEL_CONTENT_TYPE, combined)
            .await?;

        let reel = StoredReel::new(key, Utc::now(), size);
        tracing::info!(key = %reel.storage_key, url = %url, size_bytes = size, "Reel uploaded");

        Ok(reel)
    }

    /// Fetch the unmerged silent video for the degraded upload path.
    async fn silent_video_bytes(&self, video: &SilentVideo) -> Result<Vec<u8>, PipelineError> {
        if fetch::is_remote(&video.url) {
            fetch::fetch_bytes(&self.http_client, &video.url)
                .await
                .map_err(|e| PipelineError::Fallback(e.to_string()))
        } else {
            tokio::fs::read(&video.url)
                .await
                .map_err(|e| PipelineError::Fallback(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::AudioAsset;
    use async_trait::async_trait;
    use reelforge_storage::MemoryStorage;

    struct FakeScript;

    #[async_trait]
    impl ScriptGenerator for FakeScript {
        async fn generate_script(&self, subject: &str) -> Result<String, GenerationError> {
            Ok(format!("The story of {}.", subject))
        }
    }

    struct EmptyScript;

    #[async_trait]
    impl ScriptGenerator for EmptyScript {
        async fn generate_script(&self, _subject: &str) -> Result<String, GenerationError> {
            Err(GenerationError::EmptyContent)
        }
    }

    /// Mirrors the real synthesizer's contract: the asset is persisted
    /// before it is returned.
    struct FakeSpeech {
        storage: Arc<dyn Storage>,
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSpeech {
        async fn synthesize(&self, _script: &str) -> Result<AudioAsset, SynthesisError> {
            let key = keys::audio_key();
            self.storage
                .upload(&key, "audio/mpeg", b"mp3-bytes".to_vec())
                .await?;
            Ok(AudioAsset { key })
        }
    }

    struct FakeImages;

    #[async_trait]
    impl ImageGenerator for FakeImages {
        async fn generate_images(&self, _subject: &str) -> Result<Vec<String>, GenerationError> {
            Ok((1..=4)
                .map(|i| format!("https://signed.example/image/{}.png", i))
                .collect())
        }
    }

    struct FakeVideo {
        url: String,
    }

    #[async_trait]
    impl VideoSynthesizer for FakeVideo {
        async fn synthesize(
            &self,
            images: &[String],
            _prompt_text: &str,
        ) -> Result<SilentVideo, SynthesisError> {
            assert!(!images.is_empty());
            Ok(SilentVideo {
                url: self.url.clone(),
            })
        }
    }

    enum MergeMode {
        Succeed,
        FailRecoverable,
        FailStorage,
    }

    struct FakeTranscoder {
        mode: MergeMode,
    }

    #[async_trait]
    impl MediaTranscoder for FakeTranscoder {
        async fn merge_audio_into_video(
            &self,
            _video: &SilentVideo,
            _audio_key: &str,
        ) -> Result<Vec<u8>, TranscodeError> {
            match self.mode {
                MergeMode::Succeed => Ok(b"merged-video".to_vec()),
                MergeMode::FailRecoverable => {
                    Err(TranscodeError::Tool("exit status 1".to_string()))
                }
                MergeMode::FailStorage => Err(TranscodeError::Storage(
                    StorageError::BackendError("gateway down".to_string()),
                )),
            }
        }
    }

    fn orchestrator(
        storage: Arc<MemoryStorage>,
        script: Arc<dyn ScriptGenerator>,
        video_url: String,
        mode: MergeMode,
    ) -> ReelOrchestrator {
        ReelOrchestrator::new(
            script,
            Arc::new(FakeSpeech {
                storage: storage.clone(),
            }),
            Arc::new(FakeImages),
            Arc::new(FakeVideo { url: video_url }),
            Arc::new(FakeTranscoder { mode }),
            storage,
            "A cinematic video".to_string(),
        )
    }

    #[tokio::test]
    async fn test_successful_job_stores_exactly_one_reel() {
        let storage = Arc::new(MemoryStorage::default());
        let orchestrator = orchestrator(
            storage.clone(),
            Arc::new(FakeScript),
            "https://cdn.example/silent.mp4".to_string(),
            MergeMode::Succeed,
        );

        let reel = orchestrator
            .generate_and_upload_reel("Serena Williams")
            .await
            .unwrap();

        let reel_keys = storage.keys_with_prefix("reels/");
        assert_eq!(reel_keys, vec![reel.storage_key.clone()]);
        assert!(reel.storage_key.ends_with(".mp4"));
        assert_eq!(reel.id, reelforge_core::models::reel_id_from_key(&reel.storage_key));

        let stored = storage.download(&reel.storage_key).await.unwrap();
        assert_eq!(stored, b"merged-video");

        // The narration was persisted before the merge.
        assert_eq!(storage.keys_with_prefix("audio/").len(), 1);
    }

    #[tokio::test]
    async fn test_two_jobs_produce_distinct_keys() {
        let storage = Arc::new(MemoryStorage::default());
        let orchestrator = orchestrator(
            storage.clone(),
            Arc::new(FakeScript),
            "https://cdn.example/silent.mp4".to_string(),
            MergeMode::Succeed,
        );

        let first = orchestrator.generate_and_upload_reel("Pel\u{e9}").await.unwrap();
        let second = orchestrator.generate_and_upload_reel("Pel\u{e9}").await.unwrap();
        assert_ne!(first.storage_key, second.storage_key);
        assert_eq!(storage.keys_with_prefix("reels/").len(), 2);
    }

    #[tokio::test]
    async fn test_recoverable_merge_failure_degrades_to_silent_video() {
        let storage = Arc::new(MemoryStorage::default());
        // Stage the silent video as a local file so the fallback path reads it.
        let scratch = tempfile::tempdir().unwrap();
        let silent_path = scratch.path().join("silent.mp4");
        std::fs::write(&silent_path, b"silent-video").unwrap();

        let orchestrator = orchestrator(
            storage.clone(),
            Arc::new(FakeScript),
            silent_path.to_string_lossy().to_string(),
            MergeMode::FailRecoverable,
        );

        let reel = orchestrator
            .generate_and_upload_reel("Serena Williams")
            .await
            .unwrap();

        let stored = storage.download(&reel.storage_key).await.unwrap();
        assert_eq!(stored, b"silent-video");
    }

    #[tokio::test]
    async fn test_storage_failure_during_merge_is_fatal() {
        let storage = Arc::new(MemoryStorage::default());
        let orchestrator = orchestrator(
            storage.clone(),
            Arc::new(FakeScript),
            "https://cdn.example/silent.mp4".to_string(),
            MergeMode::FailStorage,
        );

        let err = orchestrator
            .generate_and_upload_reel("Serena Williams")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Merge(TranscodeError::Storage(_))
        ));
        assert!(storage.keys_with_prefix("reels/").is_empty());
    }

    #[tokio::test]
    async fn test_empty_script_fails_the_job_before_any_upload() {
        let storage = Arc::new(MemoryStorage::default());
        let orchestrator = orchestrator(
            storage.clone(),
            Arc::new(EmptyScript),
            "https://cdn.example/silent.mp4".to_string(),
            MergeMode::Succeed,
        );

        let err = orchestrator
            .generate_and_upload_reel("Pel\u{e9}")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Script(GenerationError::EmptyContent)
        ));
        assert_eq!(storage.object_count(), 0);
    }
}
