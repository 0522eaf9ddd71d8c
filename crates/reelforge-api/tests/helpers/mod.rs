//! Test wiring: a router over in-memory storage and fake pipeline
//! capabilities, so handler behavior is exercised end to end without any
//! external provider.

use async_trait::async_trait;
use axum::Router;
use reelforge_api::services::feed::FeedService;
use reelforge_api::setup::routes::setup_routes;
use reelforge_api::state::AppState;
use reelforge_core::config::FeedConfig;
use reelforge_core::Config;
use reelforge_pipeline::{
    AudioAsset, GenerationError, ImageGenerator, MediaTranscoder, ReelOrchestrator,
    ScriptGenerator, SilentVideo, SpeechSynthesizer, SynthesisError, TranscodeError,
    VideoSynthesizer,
};
use reelforge_storage::{keys, MemoryStorage, Storage};
use std::sync::Arc;

pub struct FakeScript;

#[async_trait]
impl ScriptGenerator for FakeScript {
    async fn generate_script(&self, subject: &str) -> Result<String, GenerationError> {
        Ok(format!("The story of {}.", subject))
    }
}

pub struct FailingScript;

#[async_trait]
impl ScriptGenerator for FailingScript {
    async fn generate_script(&self, _subject: &str) -> Result<String, GenerationError> {
        Err(GenerationError::EmptyContent)
    }
}

pub struct FakeSpeech {
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

pub struct FakeImages;

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate_images(&self, _subject: &str) -> Result<Vec<String>, GenerationError> {
        Ok(vec!["https://signed.example/image/1.png".to_string()])
    }
}

pub struct FakeVideo;

#[async_trait]
impl VideoSynthesizer for FakeVideo {
    async fn synthesize(
        &self,
        _images: &[String],
        _prompt_text: &str,
    ) -> Result<SilentVideo, SynthesisError> {
        Ok(SilentVideo {
            url: "https://cdn.example/silent.mp4".to_string(),
        })
    }
}

pub struct FakeTranscoder;

#[async_trait]
impl MediaTranscoder for FakeTranscoder {
    async fn merge_audio_into_video(
        &self,
        _video: &SilentVideo,
        _audio_key: &str,
    ) -> Result<Vec<u8>, TranscodeError> {
        Ok(b"merged-video".to_vec())
    }
}

/// The app under test: a router plus direct access to its backing storage.
pub struct TestApp {
    pub storage: Arc<MemoryStorage>,
    pub router: Router,
}

pub fn test_app(script_generator: Arc<dyn ScriptGenerator>) -> TestApp {
    let storage = Arc::new(MemoryStorage::default());
    let storage_dyn: Arc<dyn Storage> = storage.clone();

    let orchestrator = Arc::new(ReelOrchestrator::new(
        script_generator,
        Arc::new(FakeSpeech {
            storage: storage_dyn.clone(),
        }),
        Arc::new(FakeImages),
        Arc::new(FakeVideo),
        Arc::new(FakeTranscoder),
        storage_dyn.clone(),
        "A cinematic video".to_string(),
    ));

    let feed = FeedService::new(
        storage_dyn.clone(),
        FeedConfig {
            presign_retry_delay_ms: 1,
            ..Default::default()
        },
    );

    let config = Config::default();
    let state = Arc::new(AppState {
        config: config.clone(),
        storage: storage_dyn,
        orchestrator,
        feed,
    });

    let router = setup_routes(&config, state).expect("router setup");

    TestApp { storage, router }
}
