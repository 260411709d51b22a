//! Error types for the screener client

use screener_core::domain::job::JobKind;
use screener_core::domain::task::StatusParseError;
use thiserror::Error;

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors from a single request/response exchange
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request never produced a response (connection, timeout, TLS...)
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-success status code
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// `detail` from the body, or the status reason phrase
        message: String,
    },

    /// Backend answered successfully but the body could not be understood
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl TransportError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code, if the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::MalformedResponse(_) => None,
        }
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 500)
    }
}

impl From<StatusParseError> for TransportError {
    fn from(err: StatusParseError) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

/// Terminal failure of a job lifecycle, as reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// Submission or status request failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backend reported that the job failed
    #[error("Job failed: {0}")]
    Remote(String),

    /// Attempt budget ran out while the task was still pending
    #[error("Timed out waiting for the job after {attempts} status checks")]
    Timeout { attempts: u32 },

    /// A job of this kind is already running
    #[error("A '{0}' job is already in progress")]
    AlreadyInFlight(JobKind),

    /// Caller cancelled the job
    #[error("Job was cancelled")]
    Cancelled,

    /// No job kind with this name is registered
    #[error("Unknown job kind '{0}'")]
    UnknownKind(String),
}
