//! Configuration module
//!
//! Handles CLI configuration: backend URL, request timeout and polling
//! settings.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use screener_client::{BackendClient, PollerConfig};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the backend service
    pub api_url: String,

    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,

    /// Status polling settings
    pub poller: PollerConfig,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        self.poller.validate()
    }

    /// Build a backend client honoring the request timeout
    pub fn client(&self) -> Result<Arc<BackendClient>> {
        let http_client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Arc::new(BackendClient::with_client(
            self.api_url.clone(),
            http_client,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_secs(30),
            poller: PollerConfig::default(),
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = config();
        assert!(config.validate().is_ok());

        config.api_url = "localhost:8000".to_string();
        assert!(config.validate().is_err());

        config.api_url = "https://screener.example.com/".to_string();
        assert!(config.validate().is_ok());

        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_poller_settings_are_rejected() {
        let mut config = config();
        config.poller = config.poller.with_max_attempts(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overflowing_poll_window_is_rejected() {
        let mut config = config();
        config.poller = config
            .poller
            .with_interval(Duration::from_millis(u64::MAX))
            .with_max_attempts(2000);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_uses_api_url() {
        let client = config().client().unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
