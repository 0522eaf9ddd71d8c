//! Reel generation endpoint.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use reelforge_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReelRequest {
    #[serde(default)]
    pub celebrity_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateReelResponse {
    pub success: bool,
}

/// Run one generation job for the named subject.
///
/// The response carries no reel payload; clients discover the finished
/// video through the feed once the object is persisted.
#[utoipa::path(
    post,
    path = "/api/reels/generate",
    tag = "reels",
    request_body = GenerateReelRequest,
    responses(
        (status = 200, description = "Reel generated and uploaded", body = GenerateReelResponse),
        (status = 400, description = "Missing celebrityName", body = ErrorResponse),
        (status = 500, description = "Generation pipeline failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "generate_reel"))]
pub async fn generate_reel(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<GenerateReelRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let celebrity_name = request
        .celebrity_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing celebrityName".to_string()))?;

    state
        .orchestrator
        .generate_and_upload_reel(celebrity_name)
        .await
        .map_err(|err| {
            HttpAppError::with_public_error(err, "Failed to generate and upload reel")
        })?;

    Ok(Json(GenerateReelResponse { success: true }))
}
