//! Storage backend identifiers shared between configuration and the storage crate.

use std::fmt;
use std::str::FromStr;

/// Which object-store backend the gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Amazon S3 or an S3-compatible provider (MinIO, Spaces, ...)
    S3,
    /// Local filesystem, mainly for development
    Local,
    /// In-process map, for tests and ephemeral development setups
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("Unknown storage backend: {}", other)),
        }
    }
}
