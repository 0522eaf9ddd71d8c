//! Shared key generation for storage backends.
//!
//! Every producer goes through these helpers so the bucket layout stays
//! consistent: `reels/{uuid}.mp4`, `image/{uuid}.png`, `audio/{uuid}.mp3`.

use reelforge_core::constants::{AUDIO_PREFIX, IMAGE_PREFIX, REELS_PREFIX};
use uuid::Uuid;

/// Generate a fresh key for a finished reel.
pub fn reel_key() -> String {
    format!("{}{}.mp4", REELS_PREFIX, Uuid::new_v4())
}

/// Generate a fresh key for a generated still image.
pub fn image_key() -> String {
    format!("{}{}.png", IMAGE_PREFIX, Uuid::new_v4())
}

/// Generate a fresh key for a narration audio track.
pub fn audio_key() -> String {
    format!("{}{}.mp3", AUDIO_PREFIX, Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert!(reel_key().starts_with("reels/"));
        assert!(reel_key().ends_with(".mp4"));
        assert!(image_key().starts_with("image/"));
        assert!(image_key().ends_with(".png"));
        assert!(audio_key().starts_with("audio/"));
        assert!(audio_key().ends_with(".mp3"));
    }

    #[test]
    fn test_keys_are_unique() {
        assert_ne!(reel_key(), reel_key());
        assert_ne!(audio_key(), audio_key());
    }
}
