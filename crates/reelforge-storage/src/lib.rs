//! Reelforge Storage Library
//!
//! This crate provides the storage gateway abstraction and its backends.
//! It includes the `Storage` trait plus S3, local-filesystem, and in-memory
//! implementations.
//!
//! # Storage key format
//!
//! Objects live in one bucket under fixed prefixes:
//!
//! - finished reels: `reels/{uuid}.mp4`
//! - generated images: `image/{uuid}.png`
//! - narration audio: `audio/{uuid}.mp3`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is
//! centralized in the `keys` module so all producers stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use reelforge_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectPage, Storage, StorageError, StorageResult, StoredObject};
