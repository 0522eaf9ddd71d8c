//! HTTP error response conversion
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>`.
//! Use `AppError` (or types that convert into `HttpAppError`) for errors so
//! they render consistently (status, body, logging). Handlers that need an
//! endpoint-specific client string wrap with `HttpAppError::with_public_error`.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reelforge_core::{AppError, ErrorMetadata, LogLevel};
use reelforge_pipeline::{GenerationError, PipelineError, SynthesisError, TranscodeError};
use reelforge_storage::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse.
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from reelforge-core).
#[derive(Debug)]
pub struct HttpAppError {
    error: AppError,
    /// Endpoint-specific override for the client-facing `error` field.
    public_error: Option<String>,
}

impl HttpAppError {
    /// Wrap an error with an endpoint-specific client-facing string; the
    /// underlying error still drives status code and logging.
    pub fn with_public_error(error: impl Into<HttpAppError>, public_error: impl Into<String>) -> Self {
        Self {
            error: error.into().error,
            public_error: Some(public_error.into()),
        }
    }

    pub fn app_error(&self) -> &AppError {
        &self.error
    }
}

impl From<AppError> for HttpAppError {
    fn from(error: AppError) -> Self {
        Self {
            error,
            public_error: None,
        }
    }
}

/// Map a storage-gateway failure onto the unified error taxonomy.
fn storage_to_app(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(msg) => AppError::NotFound(msg),
        StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
        StorageError::ConfigError(msg) => AppError::Config(msg),
        other => AppError::Storage(other.to_string()),
    }
}

/// Map a whole-job pipeline failure onto the unified error taxonomy,
/// preserving the failing step's class.
fn pipeline_to_app(err: PipelineError) -> AppError {
    match err {
        PipelineError::Script(e) | PipelineError::Images(e) => match e {
            GenerationError::Storage(storage) => storage_to_app(storage),
            other => AppError::Generation(other.to_string()),
        },
        PipelineError::Speech(e) | PipelineError::Video(e) => match e {
            SynthesisError::Storage(storage) => storage_to_app(storage),
            other => AppError::Synthesis(other.to_string()),
        },
        PipelineError::Merge(e) => match e {
            TranscodeError::Storage(storage) => storage_to_app(storage),
            other => AppError::AudioProcessing(other.to_string()),
        },
        PipelineError::Fallback(msg) => AppError::Internal(msg),
        PipelineError::Storage(e) => storage_to_app(e),
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError::from(storage_to_app(err))
    }
}

impl From<PipelineError> for HttpAppError {
    fn from(err: PipelineError) -> Self {
        HttpAppError::from(pipeline_to_app(err))
    }
}

/// Convert JSON body deserialization failures into a 400 with our
/// ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError::from(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on
/// deserialization failure. Use this instead of `Json<T>` for a consistent
/// API error shape on invalid bodies.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Request failed");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.error);

        let error = self
            .public_error
            .unwrap_or_else(|| self.error.client_message());

        // Detail only leaves the process outside production.
        let message = if is_production_env() {
            None
        } else {
            Some(self.error.detailed_message())
        };

        (status, Json(ErrorResponse { error, message })).into_response()
    }
}
