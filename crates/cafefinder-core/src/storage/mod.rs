//! Namespaced key-value persistence.
//!
//! This module provides the `KeyValueStore` seam used by the favorites list
//! and the geolocation fix cache, plus two backends:
//!
//! - `FileStore`: one JSON file per key in an application directory
//! - `MemoryStore`: an in-process map, shareable between handles
//!
//! Values are opaque strings; callers own their serialization.

pub mod cached;
pub mod file;
pub mod memory;

use thiserror::Error;

pub use cached::CachedData;
pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not find {0} directory")]
    NoDirectory(&'static str),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Synchronous string storage keyed by a namespace string.
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` when nothing has been stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrites any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
