//! HTTP transports used by the catalog client
//!
//! `ReqwestTransport` performs real requests. `FixtureTransport` wraps another
//! transport and answers API requests with the fixture body while mock mode is
//! on, leaving everything above the transport (cache, parsing) unchanged.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use super::fixture::{FixtureError, FixtureSource};
use super::{CatalogError, FIXTURE_MISSING_MESSAGE, LOG_TARGET};
use crate::settings::MockModeSource;

/// A GET request against the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Absolute URL without query string
    pub url: String,
    /// Query parameters appended to the URL
    pub query: Vec<(String, String)>,
    /// Upper bound on the whole request
    pub timeout: Duration,
}

/// Performs GET requests and returns the response body
///
/// Non-success statuses are errors, so a returned body always came from a 2xx
/// response.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, request: &ApiRequest) -> Result<String, CatalogError>;
}

/// Transport backed by a reqwest client
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a transport with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: &ApiRequest) -> Result<String, CatalogError> {
        let mut builder = self.client.get(&request.url).timeout(request.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: request.url.clone(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Serves the fixture in place of API responses while mock mode is on
///
/// Requests outside `api_base`, or made while mock mode is off, go to the
/// inner transport. A missing fixture is logged and the request passes through.
pub struct FixtureTransport {
    inner: Arc<dyn HttpTransport>,
    fixture: FixtureSource,
    mock_mode: Arc<dyn MockModeSource>,
    api_base: String,
}

impl FixtureTransport {
    pub fn new(
        inner: Arc<dyn HttpTransport>,
        fixture: FixtureSource,
        mock_mode: Arc<dyn MockModeSource>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            fixture,
            mock_mode,
            api_base: api_base.into(),
        }
    }
}

#[async_trait]
impl HttpTransport for FixtureTransport {
    async fn get(&self, request: &ApiRequest) -> Result<String, CatalogError> {
        if self.mock_mode.is_enabled() && request.url.starts_with(&self.api_base) {
            match self.fixture.read_raw() {
                Ok(body) => {
                    debug!(target: LOG_TARGET, url = %request.url, "serving fixture response");
                    return Ok(body);
                }
                Err(FixtureError::Missing(_)) => {
                    error!(
                        target: LOG_TARGET,
                        "{}. Falling back to live API.", FIXTURE_MISSING_MESSAGE
                    );
                }
                Err(err) => {
                    error!(target: LOG_TARGET, "{}. Falling back to live API.", err);
                }
            }
        }

        self.inner.get(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::StaticMockMode;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HttpTransport for CountingTransport {
        async fn get(&self, _request: &ApiRequest) -> Result<String, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("[\"live\"]".to_string())
        }
    }

    fn request(url: &str) -> ApiRequest {
        ApiRequest {
            url: url.to_string(),
            query: vec![("per_page".to_string(), "50".to_string())],
            timeout: Duration::from_secs(30),
        }
    }

    fn setup(enabled: bool, fixture_body: Option<&str>) -> (FixtureTransport, Arc<CountingTransport>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("courses_api_response.json");
        if let Some(body) = fixture_body {
            fs::write(&path, body).unwrap();
        }
        let inner = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
        });
        let transport = FixtureTransport::new(
            inner.clone(),
            FixtureSource::new(path),
            Arc::new(StaticMockMode::new(enabled)),
            "https://api.umd.io/v1",
        );
        (transport, inner, temp_dir)
    }

    #[tokio::test]
    async fn test_serves_fixture_when_enabled() {
        let (transport, inner, _temp_dir) = setup(true, Some("[\"fixture\"]"));

        let body = transport
            .get(&request("https://api.umd.io/v1/courses"))
            .await
            .unwrap();

        assert_eq!(body, "[\"fixture\"]");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_serves_fixture_for_single_course_urls_too() {
        let (transport, inner, _temp_dir) = setup(true, Some("[\"fixture\"]"));

        let body = transport
            .get(&request("https://api.umd.io/v1/courses/AAAS100"))
            .await
            .unwrap();

        assert_eq!(body, "[\"fixture\"]");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_passes_through_when_disabled() {
        let (transport, inner, _temp_dir) = setup(false, Some("[\"fixture\"]"));

        let body = transport
            .get(&request("https://api.umd.io/v1/courses"))
            .await
            .unwrap();

        assert_eq!(body, "[\"live\"]");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_passes_through_for_other_hosts() {
        let (transport, inner, _temp_dir) = setup(true, Some("[\"fixture\"]"));

        let body = transport
            .get(&request("https://example.org/courses"))
            .await
            .unwrap();

        assert_eq!(body, "[\"live\"]");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_fixture_falls_through() {
        let (transport, inner, _temp_dir) = setup(true, None);

        let body = transport
            .get(&request("https://api.umd.io/v1/courses"))
            .await
            .unwrap();

        assert_eq!(body, "[\"live\"]");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reqwest_transport_reports_connection_failure() {
        let transport = ReqwestTransport::new();
        let result = transport
            .get(&ApiRequest {
                url: "http://127.0.0.1:9/v1/courses".to_string(),
                query: Vec::new(),
                timeout: Duration::from_secs(5),
            })
            .await;

        let err = result.expect_err("nothing listens on the discard port");
        assert!(err.is_transport());
    }
}
