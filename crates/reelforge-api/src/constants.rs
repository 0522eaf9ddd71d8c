//! API-level constants.

/// Prefix for all API routes.
pub const API_PREFIX: &str = "/api";

/// Maximum accepted request body size in bytes. Requests carry only small
/// JSON payloads; media never travels through this API.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Message returned when the feed has nothing to serve.
pub const EMPTY_FEED_MESSAGE: &str = "No videos available at this time. Please try again later.";
