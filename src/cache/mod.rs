//! Cache backends for storing parsed API responses
//!
//! The catalog client talks to a `CacheBackend` with two operations, `get` and
//! `set`. Backends honor expiry themselves: `get` only ever returns live entries.
//! Two implementations are provided, an on-disk JSON cache for the application
//! and an in-memory cache for tests and short-lived processes.

mod manager;
mod memory;

pub use manager::CacheManager;
pub use memory::MemoryCache;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A stored response together with its expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The key the entry was stored under
    pub key: String,
    /// The cached data (a course record or an array of them)
    pub data: Value,
    /// When the entry stops being served
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Whether the entry is still live at `now`
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Errors that can occur when writing to a cache backend
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem failure
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The entry could not be serialized
    #[error("Cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Key/value store with time-based expiry
///
/// Implementations must make each `get` and `set` individually atomic. No
/// ordering is promised across calls: concurrent writers to the same key
/// resolve as last-writer-wins.
pub trait CacheBackend: Send + Sync {
    /// Returns the entry for `key` if one exists and has not expired
    ///
    /// An expired entry found here is removed.
    fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Stores `data` under `key` until `expires_at`
    fn set(&self, key: &str, data: &Value, expires_at: DateTime<Utc>) -> Result<(), CacheError>;
}
