//! The fetch-cache-fallback course client
//!
//! Lookup order for `fetch_courses`: fixture (service-level mock mode only),
//! cache, live API. A successful live response is written through to the cache.
//! Failures are logged and degrade to an empty list or `None`; nothing is
//! returned as an error to the caller.
//!
//! There is no locking between the cache read and the write that follows a
//! miss. Two callers missing the same key both hit the API and the later write
//! wins.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::fixture::{FixtureError, FixtureSource};
use super::transport::{ApiRequest, FixtureTransport, HttpTransport, ReqwestTransport};
use super::{
    course_cache_key, courses_cache_key, CatalogError, ClientConfig, CourseRecord,
    FixtureFallback, FixtureStatus, MockStrategy, DEFAULT_COURSE_LIMIT, LOG_TARGET,
};
use crate::cache::CacheBackend;
use crate::clock::{Clock, SystemClock};
use crate::settings::MockModeSource;

/// Services the client depends on, supplied by the caller
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn HttpTransport>,
    pub cache: Arc<dyn CacheBackend>,
    pub clock: Arc<dyn Clock>,
    pub mock_mode: Arc<dyn MockModeSource>,
}

impl Collaborators {
    /// Real HTTP and wall-clock time around the given cache and flag source
    pub fn live(cache: Arc<dyn CacheBackend>, mock_mode: Arc<dyn MockModeSource>) -> Self {
        Self {
            transport: Arc::new(ReqwestTransport::new()),
            cache,
            clock: Arc::new(SystemClock),
            mock_mode,
        }
    }
}

/// Client for the UMD course catalog
pub struct CourseCatalogClient {
    transport: Arc<dyn HttpTransport>,
    cache: Arc<dyn CacheBackend>,
    clock: Arc<dyn Clock>,
    mock_mode: Arc<dyn MockModeSource>,
    fixture: FixtureSource,
    config: ClientConfig,
}

impl CourseCatalogClient {
    /// Wires the client together
    ///
    /// With `MockStrategy::Transport` the supplied transport is wrapped in a
    /// `FixtureTransport`; with `MockStrategy::Service` it is used as is.
    pub fn new(config: ClientConfig, deps: Collaborators) -> Self {
        let fixture = FixtureSource::new(config.fixture_path.clone());
        let transport: Arc<dyn HttpTransport> = match config.mock_strategy {
            MockStrategy::Service => deps.transport,
            MockStrategy::Transport => Arc::new(FixtureTransport::new(
                deps.transport,
                fixture.clone(),
                deps.mock_mode.clone(),
                config.api_base.clone(),
            )),
        };

        Self {
            transport,
            cache: deps.cache,
            clock: deps.clock,
            mock_mode: deps.mock_mode,
            fixture,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether course data is currently being served from the fixture
    pub fn is_mock_mode_enabled(&self) -> bool {
        self.mock_mode.is_enabled()
    }

    /// Whether the fixture file is present
    pub fn fixture_available(&self) -> bool {
        self.fixture.exists()
    }

    /// Fetches up to `limit` courses
    ///
    /// A `limit` of zero means `DEFAULT_COURSE_LIMIT`. In service-level mock
    /// mode the whole fixture is returned and `limit` is ignored.
    pub async fn fetch_courses(&self, limit: u32) -> Vec<CourseRecord> {
        let limit = if limit == 0 { DEFAULT_COURSE_LIMIT } else { limit };

        if self.config.mock_strategy == MockStrategy::Service && self.is_mock_mode_enabled() {
            match self.fixture.load() {
                Ok(courses) => {
                    debug!(target: LOG_TARGET, count = courses.len(), "serving courses from fixture");
                    return courses;
                }
                Err(err) => {
                    if let Some(notice) = self.fallback_status(err).notice() {
                        warn!(
                            target: LOG_TARGET,
                            path = %self.fixture.path().display(),
                            "{}", notice
                        );
                    }
                }
            }

            if self.config.fixture_fallback == FixtureFallback::Empty {
                return Vec::new();
            }
        }

        self.fetch_live_courses(limit).await
    }

    /// Reports whether listings come from the fixture, and if not, what
    /// replaces them
    ///
    /// Reads the fixture the same way `fetch_courses` does, so the answer
    /// matches what a fetch made now would do.
    pub fn fixture_status(&self) -> FixtureStatus {
        if !self.is_mock_mode_enabled() {
            return FixtureStatus::Inactive;
        }
        match self.fixture.load() {
            Ok(_) => FixtureStatus::Serving,
            Err(err) => self.fallback_status(err),
        }
    }

    /// Maps a fixture failure to the fallback the configured strategy takes
    fn fallback_status(&self, err: FixtureError) -> FixtureStatus {
        let fallback = match (self.config.mock_strategy, &err) {
            (MockStrategy::Service, _) => self.config.fixture_fallback,
            // the transport only passes through when it cannot read the file
            (MockStrategy::Transport, FixtureError::Missing(_) | FixtureError::Unreadable { .. }) => {
                FixtureFallback::LiveApi
            }
            // anything it can read is served, then rejected as a listing
            (MockStrategy::Transport, _) => FixtureFallback::Empty,
        };

        match err {
            FixtureError::Missing(_) => FixtureStatus::Missing { fallback },
            err => FixtureStatus::Unusable {
                reason: err.to_string(),
                fallback,
            },
        }
    }

    /// Fetches a single course by id
    ///
    /// Always uses the cache and live API, even in service-level mock mode.
    pub async fn fetch_course(&self, course_id: &str) -> Option<CourseRecord> {
        let cache_key = course_cache_key(course_id);

        if let Some(entry) = self.cache.get(&cache_key) {
            return Some(entry.data);
        }

        let request = self.request(format!("{}/courses/{}", self.config.api_base, course_id), Vec::new());

        match self.get_json(&request).await {
            Ok(Value::Null) => {
                debug!(target: LOG_TARGET, course_id, "API returned null for course");
                None
            }
            Ok(course) => {
                self.store(&cache_key, &course);
                Some(course)
            }
            Err(err) if err.is_transport() => {
                error!(
                    target: LOG_TARGET,
                    "Failed to fetch course {} from UMD API: {}", course_id, err
                );
                None
            }
            Err(err) => {
                error!(
                    target: LOG_TARGET,
                    "Error processing UMD API response for course {}: {}", course_id, err
                );
                None
            }
        }
    }

    /// Cache-then-API lookup for a course listing
    async fn fetch_live_courses(&self, limit: u32) -> Vec<CourseRecord> {
        let cache_key = courses_cache_key(limit);

        if let Some(entry) = self.cache.get(&cache_key) {
            if let Value::Array(courses) = entry.data {
                return courses;
            }
        }

        let request = self.request(
            format!("{}/courses", self.config.api_base),
            vec![("per_page".to_string(), limit.to_string())],
        );

        let result = self.get_json(&request).await.and_then(|value| match value {
            Value::Array(courses) => Ok(courses),
            _ => Err(CatalogError::UnexpectedShape { expected: "an array of courses" }),
        });

        match result {
            Ok(courses) => {
                self.store(&cache_key, &Value::Array(courses.clone()));
                courses
            }
            Err(err) if err.is_transport() => {
                error!(target: LOG_TARGET, "Failed to fetch courses from UMD API: {}", err);
                Vec::new()
            }
            Err(err) => {
                error!(target: LOG_TARGET, "Error processing UMD API response: {}", err);
                Vec::new()
            }
        }
    }

    fn request(&self, url: String, query: Vec<(String, String)>) -> ApiRequest {
        ApiRequest {
            url,
            query,
            timeout: self.config.request_timeout,
        }
    }

    /// Sends the request and parses the body
    async fn get_json(&self, request: &ApiRequest) -> Result<Value, CatalogError> {
        let body = self.transport.get(request).await?;
        serde_json::from_str(&body).map_err(CatalogError::InvalidJson)
    }

    /// Writes a parsed response to the cache; failures only cost a refetch
    fn store(&self, key: &str, data: &Value) {
        let expires_at = self.clock.now() + self.config.cache_ttl;
        if let Err(err) = self.cache.set(key, data, expires_at) {
            warn!(target: LOG_TARGET, key, "failed to cache API response: {}", err);
        }
    }
}
