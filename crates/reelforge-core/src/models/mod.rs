pub mod feed;
pub mod reel;

pub use feed::{FeedPage, ReelFeedItem};
pub use reel::{reel_id_from_key, StoredReel};
