//! Reelforge Pipeline Library
//!
//! This crate implements the reel generation pipeline: the content-generator
//! capabilities (script, speech, images, video), the audio/video transcoder,
//! and the orchestrator that sequences them into one end-to-end job.
//!
//! Every capability is a trait taking typed input and returning typed output
//! or a tagged error; the real provider clients are one implementation each,
//! so tests substitute in-process fakes.

pub mod error;
pub mod fetch;
pub mod image;
pub mod orchestrator;
pub mod script;
pub mod speech;
pub mod transcode;
pub mod video;

// Re-export commonly used types
pub use error::{GenerationError, PollTimeout, SynthesisError};
pub use image::{ImageGenerator, OpenAiImageGenerator};
pub use orchestrator::{PipelineError, ReelOrchestrator};
pub use script::{DeepSeekScriptGenerator, ScriptGenerator};
pub use speech::{AudioAsset, PollySpeechSynthesizer, SpeechSynthesizer};
pub use transcode::{FfmpegTranscoder, MediaTranscoder, TranscodeError};
pub use video::{RunwayVideoSynthesizer, SilentVideo, VideoSynthesizer};
