//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::constants::{API_PREFIX, MAX_BODY_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use reelforge_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Upper bound on in-flight requests before backpressure kicks in.
const MAX_IN_FLIGHT_REQUESTS: usize = 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let router = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            &format!("{}/reels", API_PREFIX),
            get(handlers::reels_feed::list_reels).options(handlers::reels_feed::reels_preflight),
        )
        .route(
            &format!("{}/reels/generate", API_PREFIX),
            post(handlers::generate_reel::generate_reel),
        )
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT_REQUESTS))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state);

    Ok(router)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.base.cors_origins.contains(&"*".to_string()) {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> = config
            .base
            .cors_origins
            .iter()
            .map(|origin| origin.parse())
            .collect();
        CorsLayer::new()
            .allow_origin(origins?)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
