//! Reelforge Core Library
//!
//! This crate provides the domain models, error types, and configuration
//! that are shared across all Reelforge components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, FeedConfig, ProviderConfig, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
