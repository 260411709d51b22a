//! Transport seam
//!
//! A transport performs exactly one request/response exchange and turns
//! non-success responses into a [`TransportError`](crate::error::TransportError).
//! It never retries: submissions are not idempotent, and retrying status
//! checks is the poller's decision.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::Result;

/// One request/response exchange against the backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and parse the JSON response body
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - Path relative to the backend base URL
    /// * `body` - Optional JSON body
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value>;
}
