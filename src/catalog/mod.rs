//! UMD course catalog client
//!
//! Fetches course records from the umd.io REST API, caches parsed responses for
//! an hour, and can substitute a local fixture file when mock mode is on. Course
//! records are kept as opaque JSON values; field-level interpretation belongs to
//! the presentation layer.

pub mod client;
pub mod fixture;
pub mod transport;

pub use client::{Collaborators, CourseCatalogClient};
pub use fixture::{
    default_fixture_path, fixture_search_paths, resolve_fixture_path, FixtureError,
    FixtureSource, FIXTURE_FILE_NAME,
};
pub use transport::{ApiRequest, FixtureTransport, HttpTransport, ReqwestTransport};

use chrono::Duration;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration as StdDuration;
use thiserror::Error;

/// One course as returned by the API, passed through untouched
pub type CourseRecord = Value;

/// Base URL for the UMD API
pub const API_BASE_URL: &str = "https://api.umd.io/v1";

/// Number of courses requested when the caller does not say
pub const DEFAULT_COURSE_LIMIT: u32 = 50;

/// Per-request timeout for the upstream API
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Time-to-live for cached responses (1 hour)
pub const CACHE_TTL_SECS: i64 = 3600;

/// The fixture in this source tree, for tests
#[cfg(test)]
pub(crate) const BUNDLED_FIXTURE_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/fixtures/courses_api_response.json"
);

/// Logged and shown when mock mode is on but the fixture file is absent
pub const FIXTURE_MISSING_MESSAGE: &str = "UMD Courses mock fixture file not found";

/// Log target shared by every catalog log line
pub(crate) const LOG_TARGET: &str = "umd_courses";

/// Errors raised on the live path; never returned from the public client API
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request could not be sent or the body could not be read
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("HTTP status {status} for url ({url})")]
    Status { status: u16, url: String },

    /// The response body is not JSON
    #[error("Invalid JSON response from UMD API")]
    InvalidJson(#[source] serde_json::Error),

    /// The response body is JSON of the wrong shape
    #[error("Invalid JSON response from UMD API: expected {expected}")]
    UnexpectedShape { expected: &'static str },
}

impl CatalogError {
    /// Whether the failure happened before a body was available to parse
    pub fn is_transport(&self) -> bool {
        matches!(self, CatalogError::Request(_) | CatalogError::Status { .. })
    }
}

/// Where the fixture substitutes for live data while mock mode is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockStrategy {
    /// `fetch_courses` returns the fixture directly; cache untouched.
    /// `fetch_course` always goes live.
    #[default]
    Service,
    /// Every request to the API host is answered with the fixture body and
    /// then cached and parsed like a live response.
    Transport,
}

impl MockStrategy {
    /// Parses a strategy name as accepted on the command line
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "service" => Some(Self::Service),
            "transport" | "http" => Some(Self::Transport),
            _ => None,
        }
    }
}

/// What service-level mock mode does when the fixture cannot be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixtureFallback {
    /// Continue exactly as if mock mode were off
    #[default]
    LiveApi,
    /// Return an empty course list
    Empty,
}

impl FixtureFallback {
    /// Parses a fallback name as accepted on the command line
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "live" | "live-api" => Some(Self::LiveApi),
            "empty" | "none" => Some(Self::Empty),
            _ => None,
        }
    }
}

impl FixtureFallback {
    /// What the user sees instead of fixture data
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::LiveApi => "Falling back to live API.",
            Self::Empty => "No courses are shown.",
        }
    }
}

/// Where course listings come from right now, as far as the fixture goes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FixtureStatus {
    /// Mock mode is off
    #[default]
    Inactive,
    /// Listings are served from the fixture
    Serving,
    /// Mock mode is on but the fixture file does not exist
    Missing { fallback: FixtureFallback },
    /// Mock mode is on but the fixture could not be read or is not a course list
    Unusable {
        reason: String,
        fallback: FixtureFallback,
    },
}

impl FixtureStatus {
    /// Whether mock mode is on, whatever happened to the fixture
    pub fn is_mock(&self) -> bool {
        !matches!(self, Self::Inactive)
    }

    /// Explains why the fixture was not used and what replaced it
    pub fn notice(&self) -> Option<String> {
        let (problem, fallback) = match self {
            Self::Inactive | Self::Serving => return None,
            Self::Missing { fallback } => (FIXTURE_MISSING_MESSAGE, fallback),
            Self::Unusable { reason, fallback } => (reason.as_str(), fallback),
        };
        Some(format!("{}. {}", problem, fallback.outcome()))
    }
}

/// Tunables for `CourseCatalogClient`
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, without a trailing slash
    pub api_base: String,
    /// Upper bound on each upstream request
    pub request_timeout: StdDuration,
    /// How long a successful response stays cached
    pub cache_ttl: Duration,
    /// How mock mode substitutes the fixture
    pub mock_strategy: MockStrategy,
    /// Behavior when the fixture is missing or corrupt
    pub fixture_fallback: FixtureFallback,
    /// Fixture file path
    pub fixture_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: API_BASE_URL.to_string(),
            request_timeout: StdDuration::from_secs(REQUEST_TIMEOUT_SECS),
            cache_ttl: Duration::seconds(CACHE_TTL_SECS),
            mock_strategy: MockStrategy::default(),
            fixture_fallback: FixtureFallback::default(),
            fixture_path: default_fixture_path(),
        }
    }
}

/// Cache key for a course listing of `limit` entries
pub fn courses_cache_key(limit: u32) -> String {
    format!("courses:{}", limit)
}

/// Cache key for a single course
pub fn course_cache_key(course_id: &str) -> String {
    format!("course:{}", course_id)
}
