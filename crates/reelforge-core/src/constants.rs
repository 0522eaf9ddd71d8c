//! Shared constants for key layout and feed behavior.

/// Key prefix for finished reels in the object store.
pub const REELS_PREFIX: &str = "reels/";

/// Key prefix for generated still images.
pub const IMAGE_PREFIX: &str = "image/";

/// Key prefix for synthesized narration audio.
pub const AUDIO_PREFIX: &str = "audio/";

/// File extensions the feed recognizes as video objects (lowercase, no dot).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "webm"];

/// Phrases that must never survive into a narration script. Generated
/// scripts are checked against these markers and offending lines stripped.
pub const DISALLOWED_SCRIPT_MARKERS: &[&str] = &[
    "as an ai",
    "ai-generated",
    "ai generated",
    "language model",
    "i cannot",
    "i'm sorry",
];

/// Default page size for the reels feed.
pub const DEFAULT_FEED_LIMIT: usize = 5;

/// Upper bound on the feed page size.
pub const MAX_FEED_LIMIT: usize = 50;
