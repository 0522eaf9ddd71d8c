//! Feed payload types.
//!
//! `ReelFeedItem` is derived per request from a `StoredReel` plus a freshly
//! issued presigned URL; it is never persisted, because the URL expires and
//! must be regenerated on each fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReelFeedItem {
    pub id: String,
    /// Time-limited presigned URL for the video object.
    pub video_url: String,
    pub caption: String,
    /// Placeholder engagement count, not real data.
    pub likes: u32,
    /// Placeholder engagement count, not real data.
    pub comments: u32,
    pub created_at: DateTime<Utc>,
}

/// One page of feed items plus the cursor to resume after it.
#[derive(Debug, Clone, Default)]
pub struct FeedPage {
    pub reels: Vec<ReelFeedItem>,
    /// Opaque continuation token; `None` means the listing is exhausted.
    pub next_cursor: Option<String>,
}

impl FeedPage {
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}
