//! Reelforge API
//!
//! The HTTP boundary: route wiring, request/response shaping, and the feed
//! service. All pipeline and storage behavior lives in the sibling crates;
//! handlers translate between HTTP and those capabilities.

pub mod api_doc;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
