//! Cache manager for persisting API responses to disk
//!
//! Provides a `CacheManager` that stores parsed JSON responses as files with
//! expiry timestamps. Entries past their expiry are never served.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{CacheBackend, CacheEntry, CacheError};
use crate::clock::{Clock, SystemClock};

static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Manages reading and writing cached data to disk
///
/// The cache manager stores data as JSON files in an XDG-compliant cache directory
/// (`~/.cache/umdcourses/` on Linux). Each file holds one `CacheEntry` including
/// the original key, which is checked on read so that two keys sanitizing to the
/// same file name never serve each other's data.
#[derive(Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    /// Time source for expiry checks
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("cache_dir", &self.cache_dir)
            .finish()
    }
}

impl CacheManager {
    /// Creates a new CacheManager using XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "umdcourses")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for expiry checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Directory holding the cache files
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to a cache file for the given key
    ///
    /// Keys look like `courses:50` or `course:AAAS100`; anything outside
    /// `[A-Za-z0-9_-]` becomes `_` so the name is valid on every platform.
    fn cache_path(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.cache_dir.join(format!("{}.json", file_stem))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Reads an entry from disk without checking expiry
    fn read_entry(&self, key: &str) -> Option<CacheEntry> {
        let content = fs::read_to_string(self.cache_path(key)).ok()?;
        let entry: CacheEntry = serde_json::from_str(&content).ok()?;
        (entry.key == key).then_some(entry)
    }
}

impl CacheBackend for CacheManager {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        let entry = self.read_entry(key)?;
        if entry.is_live(self.clock.now()) {
            return Some(entry);
        }
        let _ = fs::remove_file(self.cache_path(key));
        None
    }

    fn set(&self, key: &str, data: &Value, expires_at: DateTime<Utc>) -> Result<(), CacheError> {
        self.ensure_dir()?;

        let entry = CacheEntry {
            key: key.to_string(),
            data: data.clone(),
            expires_at,
        };
        let json = serde_json::to_string_pretty(&entry)?;

        // Write then rename so a concurrent reader never sees a torn file
        let path = self.cache_path(key);
        let tmp = path.with_extension(format!(
            "json.{}.{}.tmp",
            std::process::id(),
            WRITE_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp, json)?;
        if let Err(err) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_cache() -> (CacheManager, Arc<FixedClock>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap(),
        ));
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf()).with_clock(clock.clone());
        (cache, clock, temp_dir)
    }

    #[test]
    fn test_set_creates_file_in_cache_directory() {
        let (cache, clock, temp_dir) = create_test_cache();
        let data = json!([{"course_id": "AAAS100", "credits": "3"}]);

        cache
            .set("courses:50", &data, clock.now() + Duration::seconds(3600))
            .expect("Write should succeed");

        let expected_path = temp_dir.path().join("courses_50.json");
        assert!(expected_path.exists(), "Cache file should exist");

        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert!(content.contains("\"courses:50\""));
        assert!(content.contains("AAAS100"));
        assert!(content.contains("expires_at"));
    }

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let (cache, _clock, _temp_dir) = create_test_cache();
        assert!(cache.get("course:NOPE000").is_none());
    }

    #[test]
    fn test_get_returns_live_entry() {
        let (cache, clock, _temp_dir) = create_test_cache();
        let data = json!({"course_id": "CMSC131", "grading_method": ["Regular", "Pass-Fail"]});
        let expires_at = clock.now() + Duration::seconds(3600);

        cache.set("course:CMSC131", &data, expires_at).unwrap();

        let entry = cache.get("course:CMSC131").expect("Should read fresh cache");
        assert_eq!(entry.data, data);
        assert_eq!(entry.expires_at, expires_at);
    }

    #[test]
    fn test_get_removes_expired_entry() {
        let (cache, clock, temp_dir) = create_test_cache();
        cache
            .set("courses:30", &json!([]), clock.now() + Duration::seconds(3600))
            .unwrap();
        let path = temp_dir.path().join("courses_30.json");
        assert!(path.exists());

        clock.advance(Duration::seconds(3601));

        assert!(cache.get("courses:30").is_none());
        assert!(!path.exists(), "expired file is deleted on read");
    }

    #[test]
    fn test_keys_with_same_file_name_do_not_collide() {
        let (cache, clock, _temp_dir) = create_test_cache();
        let expires_at = clock.now() + Duration::seconds(3600);

        cache.set("course:A.B", &json!({"id": "dot"}), expires_at).unwrap();

        // "course:A_B" maps to the same file but must not be served "course:A.B"'s data
        assert!(cache.get("course:A_B").is_none());
        assert!(cache.get("course:A.B").is_some());
    }

    #[test]
    fn test_set_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache");
        let cache = CacheManager::with_dir(nested_path.clone());

        cache
            .set("courses:10", &json!([]), Utc::now() + Duration::seconds(60))
            .expect("Write should succeed");

        assert!(nested_path.join("courses_10.json").exists());
    }

    #[test]
    fn test_corrupt_file_reads_as_missing() {
        let (cache, _clock, temp_dir) = create_test_cache();
        fs::write(temp_dir.path().join("courses_50.json"), "{not json").unwrap();

        assert!(cache.get("courses:50").is_none());
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(cache) = CacheManager::new() {
            let path_str = cache.cache_dir().to_string_lossy();
            assert!(path_str.contains("umdcourses"));
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }
}
