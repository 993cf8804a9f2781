//! HTTP client configuration with builder pattern
//!
//! Runs are strictly sequential and never retried, so the only knobs are the
//! endpoint, the per-call timeout and request logging.

use std::time::Duration;

/// Default Management API root
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/analytics/v3";

/// Configuration for the Analytics Management API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// Timeout applied to every request
    pub timeout: Duration,
    /// Log method and URL of every request at debug level
    pub request_logging: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            request_logging: true,
        }
    }
}

impl ApiConfig {
    /// Create a new builder for ApiConfig
    pub fn builder() -> ApiConfigBuilder {
        ApiConfigBuilder::new()
    }
}

/// Builder for ApiConfig
#[derive(Debug)]
pub struct ApiConfigBuilder {
    config: ApiConfig,
}

impl ApiConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ApiConfig::default(),
        }
    }

    /// Set the API root; trailing slashes are stripped
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Enable/disable request logging
    pub fn request_logging(mut self, enabled: bool) -> Self {
        self.config.request_logging = enabled;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ApiConfig {
        self.config
    }
}

impl Default for ApiConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
