//! In-memory cache backend

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

use super::{CacheBackend, CacheEntry, CacheError};
use crate::clock::{Clock, SystemClock};

/// A process-local cache keyed by string
///
/// Expired entries are dropped when a read finds them.
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    /// Creates an empty cache on wall-clock time
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache that checks expiry against `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Number of stored entries, including expired ones not yet read
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Some(entry.clone());
            }
        } else {
            return None;
        }

        // The read guard is released; a concurrent set may have refreshed the key
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    fn set(&self, key: &str, data: &Value, expires_at: DateTime<Utc>) -> Result<(), CacheError> {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                key: key.to_string(),
                data: data.clone(),
                expires_at,
            },
        );
        Ok(())
    }
}
