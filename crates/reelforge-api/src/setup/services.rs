//! Application assembly: storage gateway, provider clients, orchestrator,
//! feed service, and the router over them.

use crate::services::feed::FeedService;
use crate::setup::routes::setup_routes;
use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use reelforge_core::Config;
use reelforge_pipeline::{
    DeepSeekScriptGenerator, FfmpegTranscoder, OpenAiImageGenerator, PollySpeechSynthesizer,
    ReelOrchestrator, RunwayVideoSynthesizer,
};
use reelforge_storage::create_storage;
use std::sync::Arc;

/// Build every component from configuration and wire the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    let storage = create_storage(&config).await?;
    tracing::info!(backend = %storage.backend_type(), "Storage gateway ready");

    let script_generator = Arc::new(DeepSeekScriptGenerator::from_config(&config.providers)?);
    let speech_synthesizer = Arc::new(PollySpeechSynthesizer::new(storage.clone()).await);
    let image_generator = Arc::new(OpenAiImageGenerator::from_config(
        &config.providers,
        storage.clone(),
    )?);
    let video_synthesizer = Arc::new(RunwayVideoSynthesizer::from_config(&config.providers)?);
    let transcoder = Arc::new(FfmpegTranscoder::new(
        storage.clone(),
        config.providers.ffmpeg_path.clone(),
    ));

    let orchestrator = Arc::new(ReelOrchestrator::new(
        script_generator,
        speech_synthesizer,
        image_generator,
        video_synthesizer,
        transcoder,
        storage.clone(),
        config.providers.video_prompt_text.clone(),
    ));

    let feed = FeedService::new(storage.clone(), config.feed.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        storage,
        orchestrator,
        feed,
    });

    let router = setup_routes(&config, state.clone())?;

    Ok((state, router))
}
