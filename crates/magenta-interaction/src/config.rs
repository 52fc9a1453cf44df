//! Backend endpoint configuration.
//!
//! The base URL and request timeout are environment-provided; everything
//! defaults to a local development endpoint. A path-rewrite layer in front
//! of the backend may transparently forward the `/api/*` prefix — that is
//! infrastructure and none of this crate's business.

use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the chat/publish backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl BackendConfig {
    /// Creates a configuration with an explicit base URL and the default
    /// timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize(base_url.into()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Loads configuration from the environment.
    ///
    /// Reads `MAGENTA_BACKEND_URL` (default `http://localhost:8000`) and
    /// `MAGENTA_BACKEND_TIMEOUT_SECS` (default 60). An unparseable timeout
    /// falls back to the default rather than failing startup.
    pub fn from_env() -> Self {
        let base_url =
            env::var("MAGENTA_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = env::var("MAGENTA_BACKEND_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            base_url: normalize(base_url),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Full URL of the chat endpoint.
    pub fn chat_url(&self) -> String {
        format!("{}/api/v1/chat", self.base_url)
    }

    /// Full URL of the publish endpoint.
    pub fn publish_url(&self) -> String {
        format!("{}/api/v1/publish", self.base_url)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn normalize(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_development_endpoint() {
        let config = BackendConfig::default();
        assert_eq!(config.chat_url(), "http://localhost:8000/api/v1/chat");
        assert_eq!(config.publish_url(), "http://localhost:8000/api/v1/publish");
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let config = BackendConfig::new("http://backend:9000/");
        assert_eq!(config.chat_url(), "http://backend:9000/api/v1/chat");
    }
}
