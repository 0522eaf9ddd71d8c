//! Speech synthesis via Amazon Polly.
//!
//! The synthesized narration is persisted to the storage gateway before the
//! asset is returned, so later pipeline steps reference it by key instead of
//! holding the payload in process memory.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_polly::types::{Engine, LanguageCode, OutputFormat, VoiceId};
use reelforge_storage::{keys, Storage};
use std::sync::Arc;

use crate::error::SynthesisError;

const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// A persisted narration track, referenced by storage key.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAsset {
    pub key: String,
}

/// Capability: turn a narration script into a persisted audio asset.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, script: &str) -> Result<AudioAsset, SynthesisError>;
}

/// Speech synthesizer backed by Amazon Polly with a fixed voice profile.
pub struct PollySpeechSynthesizer {
    client: aws_sdk_polly::Client,
    storage: Arc<dyn Storage>,
}

impl PollySpeechSynthesizer {
    pub async fn new(storage: Arc<dyn Storage>) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: aws_sdk_polly::Client::new(&sdk_config),
            storage,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for PollySpeechSynthesizer {
    #[tracing::instrument(skip(self, script), fields(script_chars = script.len()))]
    async fn synthesize(&self, script: &str) -> Result<AudioAsset, SynthesisError> {
        if script.trim().is_empty() {
            return Err(SynthesisError::EmptyInput("script".to_string()));
        }

        let response = self
            .client
            .synthesize_speech()
            .output_format(OutputFormat::Mp3)
            .voice_id(VoiceId::Joanna)
            .engine(Engine::Neural)
            .language_code(LanguageCode::EnUs)
            .text(script)
            .send()
            .await
            .map_err(|e| SynthesisError::Provider(e.to_string()))?;

        let audio = response
            .audio_stream
            .collect()
            .await
            .map_err(|e| SynthesisError::Provider(format!("audio stream read failed: {}", e)))?
            .into_bytes();

        if audio.is_empty() {
            return Err(SynthesisError::NoAudio);
        }

        let key = keys::audio_key();
        self.storage
            .upload(&key, AUDIO_CONTENT_TYPE, audio.to_vec())
            .await?;

        tracing::info!(key = %key, size_bytes = audio.len() as u64, "Narration audio persisted");

        Ok(AudioAsset { key })
    }
}
