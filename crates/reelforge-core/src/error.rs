//! Error types module
//!
//! All fatal pipeline and feed failures are unified under the `AppError`
//! enum before they reach the HTTP boundary. The finer-grained error enums
//! (storage, generation, synthesis, transcode) live next to the code that
//! produces them; the API crate converts them into `AppError` so every
//! response renders consistently.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like degraded merges
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Content generation error: {0}")]
    Generation(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Audio processing error: {0}")]
    AudioProcessing(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, log_level).
/// Reduces duplication in the ErrorMetadata impl; client_message stays per-variant
/// for dynamic content.
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::Config(_) => (500, "CONFIG_ERROR", false, LogLevel::Error),
        AppError::Generation(_) => (500, "GENERATION_ERROR", true, LogLevel::Error),
        AppError::Synthesis(_) => (500, "SYNTHESIS_ERROR", true, LogLevel::Error),
        AppError::AudioProcessing(_) => (500, "AUDIO_PROCESSING_ERROR", true, LogLevel::Warn),
        AppError::Storage(_) => (500, "STORAGE_ERROR", true, LogLevel::Error),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Config(_) => "Config",
            AppError::Generation(_) => "Generation",
            AppError::Synthesis(_) => "Synthesis",
            AppError::AudioProcessing(_) => "AudioProcessing",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Config(_) => "Service is misconfigured".to_string(),
            AppError::Generation(_) => "Failed to generate content".to_string(),
            AppError::Synthesis(_) => "Failed to synthesize media".to_string(),
            AppError::AudioProcessing(_) => "Failed to process audio".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_storage() {
        let err = AppError::Storage("bucket unreachable".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access storage");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_invalid_input() {
        let err = AppError::InvalidInput("Missing celebrityName".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Missing celebrityName");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_audio_processing_is_warn() {
        let err = AppError::AudioProcessing("merge failed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "AUDIO_PROCESSING_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let inner = anyhow::anyhow!("connection refused");
        let err = AppError::InternalWithSource {
            message: "pipeline failed".to_string(),
            source: inner.context("fetching silent video"),
        };
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("Caused by: fetching silent video"));
    }

    #[test]
    fn test_internal_hides_detail_from_client() {
        let err = AppError::Internal("stack trace goes here".to_string());
        assert_eq!(err.client_message(), "Internal server error");
    }
}
