//! Durable reel records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The canonical durable record of a generated reel: one object under the
/// `reels/` prefix. The feed never represents reels by any other identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoredReel {
    /// Stable identifier, derived from the storage key's file stem.
    pub id: String,
    /// Object key in the bucket, e.g. `reels/2f4d….mp4`.
    pub storage_key: String,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
}

impl StoredReel {
    pub fn new(storage_key: String, last_modified: DateTime<Utc>, size: u64) -> Self {
        let id = reel_id_from_key(&storage_key);
        Self {
            id,
            storage_key,
            last_modified,
            size,
        }
    }
}

/// Derive a stable reel id from a storage key.
///
/// Keys are `reels/<uuid>.<ext>`; the id is the file stem (the uuid minted
/// at upload time). Deriving rather than minting keeps ids identical across
/// repeated listings of an unchanged store.
pub fn reel_id_from_key(key: &str) -> String {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    match file_name.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}
