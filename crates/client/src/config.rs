//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Client configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `API_URL`: base URL of the ordering API (default: `"http://localhost:8989/api/v1"`)
/// - `STATE_DIR`: directory holding persisted cart and session state (default: `".shopctl"`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `PAGE_SIZE`: catalog page size (default: `5`)
/// - `REQUEST_TIMEOUT_SECS`: HTTP request timeout (default: `30`)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub state_dir: PathBuf,
    pub log_level: String,
    pub page_size: u32,
    pub request_timeout: Duration,
}

pub const DEFAULT_API_URL: &str = "http://localhost:8989/api/v1";

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: std::env::var("API_URL").unwrap_or(defaults.api_url),
            state_dir: std::env::var("STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_dir),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            page_size: std::env::var("PAGE_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|&p| p > 0)
                .unwrap_or(defaults.page_size),
            request_timeout: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }

    /// Returns the API base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            state_dir: PathBuf::from(".shopctl"),
            log_level: "info".to_string(),
            page_size: 5,
            request_timeout: Duration::from_secs(30),
        }
    }
}
