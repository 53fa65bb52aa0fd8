//! Command-line interface parsing for the UMD course browser
//!
//! This module handles parsing of CLI arguments using clap and turns them into a
//! `StartupConfig` holding the client configuration and startup actions.

use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::{ClientConfig, FixtureFallback, MockStrategy};

/// Number of courses shown on the course page
pub const PAGE_COURSE_LIMIT: u32 = 30;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The mock strategy name is not recognized
    #[error("Invalid mock strategy: '{0}'. Valid strategies: service, transport")]
    InvalidMockStrategy(String),

    /// The fixture fallback name is not recognized
    #[error("Invalid fixture fallback: '{0}'. Valid fallbacks: live, empty")]
    InvalidFixtureFallback(String),

    /// The course limit is zero
    #[error("Invalid limit: must be at least 1")]
    InvalidLimit,

    /// The API base is not an http(s) URL
    #[error("Invalid API base URL: '{0}'")]
    InvalidApiBase(String),
}

/// UMD Courses - browse the University of Maryland course catalog
#[derive(Parser, Debug)]
#[command(name = "umdcourses")]
#[command(about = "Browse the UMD course catalog with caching and a mock mode")]
#[command(version)]
pub struct Cli {
    /// Number of courses to request
    #[arg(long, default_value_t = PAGE_COURSE_LIMIT)]
    pub limit: u32,

    /// Turn mock mode on (persisted) before starting
    #[arg(long, conflicts_with = "no_mock")]
    pub mock: bool,

    /// Turn mock mode off (persisted) before starting
    #[arg(long)]
    pub no_mock: bool,

    /// Where the fixture replaces live data: service or transport
    #[arg(long, value_name = "STRATEGY", default_value = "service")]
    pub mock_strategy: String,

    /// What to do when mock mode is on but the fixture is unusable: live or empty
    #[arg(long, value_name = "FALLBACK", default_value = "live")]
    pub fixture_fallback: String,

    /// Path to the fixture file
    #[arg(long, value_name = "PATH")]
    pub fixture: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Print the course list and exit instead of starting the interface
    #[arg(long)]
    pub list: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Catalog client configuration
    pub client: ClientConfig,
    /// How many courses to load
    pub limit: u32,
    /// New value to persist for the mock-mode flag, if requested
    pub set_mock_mode: Option<bool>,
    /// Print and exit
    pub list_only: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            limit: PAGE_COURSE_LIMIT,
            set_mock_mode: None,
            list_only: false,
        }
    }
}

/// Parses a mock strategy argument
pub fn parse_mock_strategy_arg(s: &str) -> Result<MockStrategy, CliError> {
    MockStrategy::parse(s).ok_or_else(|| CliError::InvalidMockStrategy(s.to_string()))
}

/// Parses a fixture fallback argument
pub fn parse_fixture_fallback_arg(s: &str) -> Result<FixtureFallback, CliError> {
    FixtureFallback::parse(s).ok_or_else(|| CliError::InvalidFixtureFallback(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if any argument value is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.limit == 0 {
            return Err(CliError::InvalidLimit);
        }

        let mut client = ClientConfig {
            mock_strategy: parse_mock_strategy_arg(&cli.mock_strategy)?,
            fixture_fallback: parse_fixture_fallback_arg(&cli.fixture_fallback)?,
            ..ClientConfig::default()
        };

        if let Some(path) = &cli.fixture {
            client.fixture_path = path.clone();
        }

        if let Some(base) = &cli.api_base {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(CliError::InvalidApiBase(base.clone()));
            }
            client.api_base = base.trim_end_matches('/').to_string();
        }

        let set_mock_mode = match (cli.mock, cli.no_mock) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        Ok(StartupConfig {
            client,
            limit: cli.limit,
            set_mock_mode,
            list_only: cli.list,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["umdcourses"]);
        assert_eq!(cli.limit, 30);
        assert!(!cli.mock);
        assert!(!cli.no_mock);
        assert!(!cli.list);
        assert_eq!(cli.mock_strategy, "service");
    }

    #[test]
    fn test_startup_config_defaults() {
        let cli = Cli::parse_from(["umdcourses"]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.limit, 30);
        assert!(config.set_mock_mode.is_none());
        assert!(!config.list_only);
        assert_eq!(config.client.mock_strategy, MockStrategy::Service);
        assert_eq!(config.client.fixture_fallback, FixtureFallback::LiveApi);
        assert_eq!(config.client.api_base, "https://api.umd.io/v1");
    }

    #[test]
    fn test_mock_flags() {
        let on = StartupConfig::from_cli(&Cli::parse_from(["umdcourses", "--mock"])).unwrap();
        assert_eq!(on.set_mock_mode, Some(true));

        let off = StartupConfig::from_cli(&Cli::parse_from(["umdcourses", "--no-mock"])).unwrap();
        assert_eq!(off.set_mock_mode, Some(false));
    }

    #[test]
    fn test_mock_and_no_mock_conflict() {
        let result = Cli::try_parse_from(["umdcourses", "--mock", "--no-mock"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_transport_strategy_and_empty_fallback() {
        let cli = Cli::parse_from([
            "umdcourses",
            "--mock-strategy",
            "transport",
            "--fixture-fallback",
            "empty",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.client.mock_strategy, MockStrategy::Transport);
        assert_eq!(config.client.fixture_fallback, FixtureFallback::Empty);
    }

    #[test]
    fn test_invalid_strategy() {
        let cli = Cli::parse_from(["umdcourses", "--mock-strategy", "decorator"]);
        let err = StartupConfig::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("Invalid mock strategy"));
        assert!(err.to_string().contains("decorator"));
    }

    #[test]
    fn test_invalid_fallback() {
        let cli = Cli::parse_from(["umdcourses", "--fixture-fallback", "retry"]);
        assert!(matches!(
            StartupConfig::from_cli(&cli),
            Err(CliError::InvalidFixtureFallback(_))
        ));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let cli = Cli::parse_from(["umdcourses", "--limit", "0"]);
        assert!(matches!(StartupConfig::from_cli(&cli), Err(CliError::InvalidLimit)));
    }

    #[test]
    fn test_api_base_and_fixture_overrides() {
        let cli = Cli::parse_from([
            "umdcourses",
            "--api-base",
            "http://localhost:8080/v1/",
            "--fixture",
            "/tmp/courses.json",
            "--limit",
            "10",
            "--list",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.client.api_base, "http://localhost:8080/v1");
        assert_eq!(config.client.fixture_path, PathBuf::from("/tmp/courses.json"));
        assert_eq!(config.limit, 10);
        assert!(config.list_only);
    }

    #[test]
    fn test_invalid_api_base() {
        let cli = Cli::parse_from(["umdcourses", "--api-base", "api.umd.io"]);
        assert!(matches!(
            StartupConfig::from_cli(&cli),
            Err(CliError::InvalidApiBase(_))
        ));
    }
}
