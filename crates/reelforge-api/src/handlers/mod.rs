pub mod generate_reel;
pub mod health;
pub mod reels_feed;
