//! Application state shared by all handlers.

use reelforge_core::Config;
use reelforge_pipeline::ReelOrchestrator;
use reelforge_storage::Storage;
use std::sync::Arc;

use crate::services::feed::FeedService;

/// Everything a handler can reach: configuration, the storage gateway, the
/// generation orchestrator, and the feed service. Built once at startup.
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub orchestrator: Arc<ReelOrchestrator>,
    pub feed: FeedService,
}
