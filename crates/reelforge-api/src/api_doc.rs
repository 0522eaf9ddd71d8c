//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::generate_reel::generate_reel,
        crate::handlers::reels_feed::list_reels,
        crate::handlers::health::health,
    ),
    components(schemas(
        crate::handlers::generate_reel::GenerateReelRequest,
        crate::handlers::generate_reel::GenerateReelResponse,
        crate::handlers::reels_feed::ReelsResponse,
        crate::handlers::reels_feed::PaginationMeta,
        crate::handlers::health::HealthResponse,
        crate::error::ErrorResponse,
        reelforge_core::models::ReelFeedItem,
    )),
    tags(
        (name = "reels", description = "Reel generation and feed"),
        (name = "ops", description = "Operational endpoints")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_lists_the_public_routes() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();
        let paths = json.get("paths").unwrap();
        assert!(paths.get("/api/reels").is_some());
        assert!(paths.get("/api/reels/generate").is_some());
        assert!(paths.get("/health").is_some());
    }
}
