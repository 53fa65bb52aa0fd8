//! Local fixture standing in for the "all courses" API response
//!
//! The default fixture location is resolved when the program starts, not when
//! it is built, so an installed binary finds the file shipped next to it.

use directories::ProjectDirs;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::CourseRecord;

/// File name of the fixture in every search location
pub const FIXTURE_FILE_NAME: &str = "courses_api_response.json";

/// Places searched for the fixture, in order
///
/// 1. `fixtures/` next to the executable (how release archives ship it)
/// 2. the XDG data dir, e.g. `~/.local/share/umdcourses/`
/// 3. `fixtures/` under the working directory (running from a checkout)
pub fn fixture_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(exe_dir.join("fixtures").join(FIXTURE_FILE_NAME));
    }
    if let Some(project_dirs) = ProjectDirs::from("", "", "umdcourses") {
        paths.push(project_dirs.data_dir().join(FIXTURE_FILE_NAME));
    }
    paths.push(Path::new("fixtures").join(FIXTURE_FILE_NAME));
    paths
}

/// Picks the first candidate that exists, else the first candidate
///
/// Returning a path even when nothing exists keeps the "fixture not found"
/// notice pointing at the preferred location.
pub fn resolve_fixture_path(candidates: &[PathBuf]) -> PathBuf {
    candidates
        .iter()
        .find(|path| path.is_file())
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_else(|| PathBuf::from(FIXTURE_FILE_NAME))
}

/// Default fixture location for this process
pub fn default_fixture_path() -> PathBuf {
    resolve_fixture_path(&fixture_search_paths())
}

/// Errors that can occur when reading the fixture file
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The file does not exist
    #[error("fixture file not found: {}", .0.display())]
    Missing(PathBuf),

    /// The file exists but could not be read
    #[error("failed to read fixture {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid JSON
    #[error("fixture {} is not valid JSON: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file is JSON but not a list of courses
    #[error("fixture {} does not contain a JSON array", .0.display())]
    NotAList(PathBuf),
}

/// A JSON fixture file on disk
///
/// The file is re-read on every call so edits show up without a restart.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    path: PathBuf,
}

impl FixtureSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the fixture file is present
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Returns the raw file contents
    pub fn read_raw(&self) -> Result<String, FixtureError> {
        fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                FixtureError::Missing(self.path.clone())
            } else {
                FixtureError::Unreadable {
                    path: self.path.clone(),
                    source,
                }
            }
        })
    }

    /// Reads and parses the fixture as a list of course records
    ///
    /// Records come back exactly as stored; array fields are not flattened.
    pub fn load(&self) -> Result<Vec<CourseRecord>, FixtureError> {
        let raw = self.read_raw()?;
        let value: Value = serde_json::from_str(&raw).map_err(|source| FixtureError::Invalid {
            path: self.path.clone(),
            source,
        })?;

        match value {
            Value::Array(courses) => Ok(courses),
            _ => Err(FixtureError::NotAList(self.path.clone())),
        }
    }
}
