//! Persisted application settings
//!
//! Holds the mock-mode toggle. The catalog client only ever reads it through
//! the `MockModeSource` trait and asks again on every request, so a toggle takes
//! effect on the next fetch without touching anything already cached.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Errors that can occur when saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Filesystem failure
    #[error("Failed to write settings: {0}")]
    Io(#[from] std::io::Error),

    /// Settings could not be encoded
    #[error("Failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// User-editable settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Serve course data from the local fixture instead of the live API
    #[serde(default)]
    pub mock_mode_enabled: bool,
}

/// Read-only view of the mock-mode flag
pub trait MockModeSource: Send + Sync {
    /// Whether mock mode is currently on
    fn is_enabled(&self) -> bool;
}

/// Settings persisted as JSON in the XDG config directory
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store at `~/.config/umdcourses/settings.json` (or platform equivalent)
    ///
    /// Returns `None` if no config directory can be determined.
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "umdcourses")?;
        Some(Self::with_path(project_dirs.config_dir().join("settings.json")))
    }

    /// Creates a store backed by an explicit file
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the settings file
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Loads settings, falling back to defaults when the file is missing or unreadable
    pub fn load(&self) -> Settings {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Writes settings to disk, creating the parent directory if needed
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Persists a new value for the mock-mode flag
    pub fn set_mock_mode(&self, enabled: bool) -> Result<(), SettingsError> {
        let mut settings = self.load();
        settings.mock_mode_enabled = enabled;
        self.save(&settings)?;
        tracing::info!(enabled, "mock mode setting saved");
        Ok(())
    }
}

impl MockModeSource for SettingsStore {
    fn is_enabled(&self) -> bool {
        self.load().mock_mode_enabled
    }
}

/// An in-process mock-mode flag
#[derive(Debug, Default)]
pub struct StaticMockMode(AtomicBool);

impl StaticMockMode {
    pub fn new(enabled: bool) -> Self {
        Self(AtomicBool::new(enabled))
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::SeqCst);
    }
}

impl MockModeSource for StaticMockMode {
    fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
