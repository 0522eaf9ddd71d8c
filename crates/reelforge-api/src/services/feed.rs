//! The reels feed: paginated listing of stored reels with fresh presigned
//! URLs and synthesized engagement placeholders.
//!
//! Stateless across requests: pagination state lives entirely in the
//! cursor echoed by the caller. Presigned URLs are regenerated on every
//! fetch because they expire.

use futures::future::join_all;
use rand::Rng;
use reelforge_core::config::FeedConfig;
use reelforge_core::constants::{REELS_PREFIX, VIDEO_EXTENSIONS};
use reelforge_core::models::{FeedPage, ReelFeedItem, StoredReel};
use reelforge_storage::{Storage, StorageError};
use std::sync::Arc;
use std::time::Duration;

/// Serves feed pages from the storage gateway.
#[derive(Clone)]
pub struct FeedService {
    storage: Arc<dyn Storage>,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(storage: Arc<dyn Storage>, config: FeedConfig) -> Self {
        Self { storage, config }
    }

    /// List up to `limit` reels starting after `cursor`.
    ///
    /// One bad item never fails the page: an object whose presign keeps
    /// failing is dropped after the configured retries. Listing failure
    /// itself fails the whole request. `shuffle` permutes the page order
    /// without changing its item set.
    #[tracing::instrument(skip(self), fields(limit, cursor = cursor.unwrap_or("-"), shuffle))]
    pub async fn list_reels(
        &self,
        limit: usize,
        cursor: Option<&str>,
        shuffle: bool,
    ) -> Result<FeedPage, StorageError> {
        let page = self.storage.list_page(REELS_PREFIX, limit, cursor).await?;

        let candidates: Vec<StoredReel> = page
            .objects
            .into_iter()
            .filter(|object| is_video_key(&object.key))
            .map(|object| StoredReel::new(object.key, object.last_modified, object.size))
            .collect();

        // Resolve presigned URLs concurrently; join_all keeps the
        // originating object order for reproducible pagination.
        let resolved = join_all(candidates.into_iter().map(|reel| self.resolve_item(reel))).await;
        let mut reels: Vec<ReelFeedItem> = resolved.into_iter().flatten().collect();

        if shuffle {
            use rand::seq::SliceRandom;
            reels.shuffle(&mut rand::rng());
        }

        tracing::info!(returned = reels.len(), has_more = page.next_cursor.is_some(), "Feed page served");

        Ok(FeedPage {
            reels,
            next_cursor: page.next_cursor,
        })
    }

    /// Exchange one stored reel for a feed item, retrying the presign a few
    /// times before giving the item up.
    async fn resolve_item(&self, reel: StoredReel) -> Option<ReelFeedItem> {
        let expiry = Duration::from_secs(self.config.presign_expiry_secs);
        let max_attempts = self.config.presign_retry_attempts.max(1);

        let mut attempt = 0;
        let video_url = loop {
            attempt += 1;
            match self
                .storage
                .get_presigned_url(&reel.storage_key, expiry)
                .await
            {
                Ok(url) => break url,
                Err(e) if attempt < max_attempts => {
                    tracing::warn!(
                        key = %reel.storage_key,
                        attempt,
                        max_attempts,
                        error = %e,
                        "Presign failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(self.config.presign_retry_delay_ms))
                        .await;
                }
                Err(e) => {
                    tracing::error!(
                        key = %reel.storage_key,
                        attempts = attempt,
                        error = %e,
                        "Dropping feed item after repeated presign failures"
                    );
                    return None;
                }
            }
        };

        // Engagement numbers are synthetic placeholders, not real data.
        let mut rng = rand::rng();
        Some(ReelFeedItem {
            caption: format!("Reel #{}", reel.id),
            id: reel.id,
            video_url,
            likes: rng.random_range(0..10_000),
            comments: rng.random_range(0..1_000),
            created_at: reel.last_modified,
        })
    }
}

/// Whether a storage key names a recognized video object.
fn is_video_key(key: &str) -> bool {
    match key.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_lowercase();
            VIDEO_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}
