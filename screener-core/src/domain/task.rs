//! Task domain types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason reported when the backend marks a task as failed without saying why
pub const DEFAULT_FAILURE_REASON: &str = "Task failed.";

/// Reason reported for tasks the backend revoked before they finished
pub const REVOKED_REASON: &str = "Task was revoked.";

/// Opaque identifier the backend returns when a job is submitted
///
/// Immutable once issued. The client never interprets its contents; it is
/// only echoed back to the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskHandle(String);

impl TaskHandle {
    /// Create a handle from a backend-issued id
    ///
    /// Blank ids are rejected: a submission that returns one cannot be polled.
    pub fn new(id: impl Into<String>) -> Result<Self, StatusParseError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(StatusParseError::EmptyTaskId);
        }
        Ok(Self(id))
    }

    /// Get the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classified status of a backend task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Accepted but not finished. `state` is the raw backend state name.
    Pending { state: String },
    /// Finished successfully with an opaque result value
    Succeeded(serde_json::Value),
    /// Finished with a failure reason
    Failed(String),
}

impl TaskStatus {
    /// Whether no further transitions can follow this status
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending { .. })
    }
}

/// A status payload that cannot be classified
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusParseError {
    /// Payload is not shaped like a status report
    #[error("invalid status payload: {0}")]
    InvalidPayload(String),

    /// Status field holds a state name the client does not know
    #[error("unknown task state '{0}'")]
    UnknownState(String),

    /// Backend returned a blank task id
    #[error("task id is empty")]
    EmptyTaskId,
}
