//! Error types shared by the content-generator capabilities.
//!
//! Generation (script, images) and synthesis (speech, video) failures are
//! separate enums so the orchestrator and the HTTP boundary can report the
//! failing step precisely. The transcoder's error lives in `transcode`
//! because its recoverable/fatal split drives the degrade policy there.

use reelforge_storage::StorageError;
use thiserror::Error;

/// Content generation (script/image) errors.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("subject name must not be empty")]
    EmptySubject,

    /// The upstream call succeeded but produced no usable text. Surfaced
    /// explicitly instead of continuing with an empty script.
    #[error("upstream returned empty content")]
    EmptyContent,

    #[error("upstream returned no usable images")]
    NoUsableImages,

    #[error("upstream request failed with status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Speech/video synthesis errors.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("synthesis input must not be empty: {0}")]
    EmptyInput(String),

    #[error("speech provider returned no audio payload")]
    NoAudio,

    #[error("speech provider error: {0}")]
    Provider(String),

    #[error("video generation job failed: {0}")]
    JobFailed(String),

    #[error("video generation succeeded but returned no output")]
    MissingOutput,

    #[error("upstream request failed with status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Timeout(#[from] PollTimeout),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Raised when a polling loop exhausts its attempt budget without observing
/// a terminal job status. Kept as its own type so callers can tell a stall
/// apart from a reported failure.
#[derive(Debug, Error)]
#[error("timed out after {attempts} status checks over {waited_secs}s")]
pub struct PollTimeout {
    pub attempts: u32,
    pub waited_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_distinct_from_job_failure() {
        let timeout = SynthesisError::Timeout(PollTimeout {
            attempts: 60,
            waited_secs: 600,
        });
        assert!(matches!(timeout, SynthesisError::Timeout(_)));
        assert!(!matches!(timeout, SynthesisError::JobFailed(_)));
        assert_eq!(
            timeout.to_string(),
            "timed out after 60 status checks over 600s"
        );
    }

    #[test]
    fn test_storage_error_is_distinguishable() {
        let err = SynthesisError::from(StorageError::UploadFailed("denied".to_string()));
        assert!(matches!(err, SynthesisError::Storage(_)));
    }
}
