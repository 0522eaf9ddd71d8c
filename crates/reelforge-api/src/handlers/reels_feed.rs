//! Reels feed endpoint.

use crate::constants::EMPTY_FEED_MESSAGE;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use reelforge_core::constants::{DEFAULT_FEED_LIMIT, MAX_FEED_LIMIT};
use reelforge_core::models::ReelFeedItem;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReelsQuery {
    /// Page counter echoed back to the client; listing position comes from
    /// `token`.
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Opaque continuation token from the previous page.
    #[serde(default)]
    pub token: Option<String>,
    /// When present, the page order is shuffled for this session.
    #[serde(default)]
    pub session: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> usize {
    DEFAULT_FEED_LIMIT
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: usize,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReelsResponse {
    pub reels: Vec<ReelFeedItem>,
    pub pagination: PaginationMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Serve one page of the reels feed.
#[utoipa::path(
    get,
    path = "/api/reels",
    tag = "reels",
    params(ReelsQuery),
    responses(
        (status = 200, description = "One page of reels", body = ReelsResponse),
        (status = 500, description = "Storage listing failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, params),
    fields(
        page = params.page,
        limit = params.limit,
        has_token = params.token.is_some(),
        operation = "list_reels"
    )
)]
pub async fn list_reels(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReelsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let limit = params.limit.clamp(1, MAX_FEED_LIMIT);
    let shuffle = params.session.is_some();

    let page = state
        .feed
        .list_reels(limit, params.token.as_deref(), shuffle)
        .await
        .map_err(|err| {
            HttpAppError::with_public_error(err, "Failed to fetch videos from storage")
        })?;

    let message = page.reels.is_empty().then(|| EMPTY_FEED_MESSAGE.to_string());

    let response = ReelsResponse {
        pagination: PaginationMeta {
            page: params.page,
            limit,
            has_more: page.has_more(),
            next_token: page.next_cursor,
        },
        reels: page.reels,
        message,
    };

    Ok(Json(response))
}

/// Plain OPTIONS on the collection; preflight requests with CORS headers are
/// answered by the CORS layer before they reach the router.
pub async fn reels_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
