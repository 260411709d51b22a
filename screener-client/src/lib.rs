//! Screener HTTP Client
//!
//! Client for the screener backend's long-running jobs. It submits jobs,
//! polls their status until they finish, and reports exactly one terminal
//! result per submission.
//!
//! The crate is layered:
//! - [`Transport`]: one request/response exchange ([`BackendClient`] over reqwest)
//! - [`TaskPoller`]: fixed-interval status polling with a hard attempt cap
//! - [`JobController`]: per-kind submission guard and lifecycle events
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use screener_client::{BackendClient, JobController, PollerConfig};
//! use screener_core::domain::job::{JobKind, JobSpec};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(BackendClient::new("http://localhost:8000"));
//!     let controller = Arc::new(JobController::new(
//!         client,
//!         JobSpec::builtin(),
//!         PollerConfig::default(),
//!     ));
//!
//!     let ticket = controller.submit(&JobKind::GENERATE_CV)?;
//!     if let Some(event) = ticket.wait().await {
//!         println!("{:?}", event.result);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod poller;
pub mod scheduler;
pub mod tasks;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::PollerConfig;
pub use controller::{JobController, JobEvent, JobSlot, JobTicket};
pub use error::{JobError, Result, TransportError};
pub use poller::{PollOutcome, PollerState, TaskPoller};
pub use scheduler::{Scheduler, TokioScheduler};
pub use transport::Transport;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::debug;

/// HTTP client for the screener backend API
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// Base URL of the backend (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl BackendClient {
    /// Create a new backend client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the backend API (e.g., "http://localhost:8000")
    ///
    /// # Example
    /// ```
    /// use screener_client::BackendClient;
    ///
    /// let client = BackendClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new backend client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use screener_client::BackendClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = BackendClient::with_client("http://localhost:8000", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the absolute URL for a backend path
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and parse its JSON body
    ///
    /// Non-success statuses become `TransportError::Api`; a success status
    /// with a body that is not JSON becomes `TransportError::MalformedResponse`.
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(TransportError::api_error(
                status.as_u16(),
                error_message(status, &body),
            ));
        }

        serde_json::from_slice(&body).map_err(|e| {
            TransportError::MalformedResponse(format!("Failed to parse JSON response: {}", e))
        })
    }
}

#[async_trait]
impl Transport for BackendClient {
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }
}

/// Human-readable message for a failed response
///
/// Uses the string `detail` field of a JSON body when there is one, and the
/// status reason phrase otherwise.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}
