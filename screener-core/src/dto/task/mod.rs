//! Task DTOs for the backend task API

use serde::{Deserialize, Serialize};

use crate::domain::task::{
    DEFAULT_FAILURE_REASON, REVOKED_REASON, StatusParseError, TaskHandle, TaskStatus,
};

/// Response of a job submission endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSubmission {
    #[serde(alias = "taskId")]
    pub task_id: String,
    /// Backend state at submission time (usually "PENDING")
    #[serde(default)]
    pub status: Option<String>,
}

impl TaskSubmission {
    /// Extract the handle to poll
    pub fn handle(&self) -> Result<TaskHandle, StatusParseError> {
        TaskHandle::new(self.task_id.clone())
    }
}

/// Response of the task status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusReport {
    #[serde(default, alias = "taskId")]
    pub task_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TryFrom<TaskStatusReport> for TaskStatus {
    type Error = StatusParseError;

    fn try_from(report: TaskStatusReport) -> Result<Self, Self::Error> {
        match report.status.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "RECEIVED" | "STARTED" | "RETRY" => Ok(TaskStatus::Pending {
                state: report.status,
            }),
            "SUCCESS" => Ok(TaskStatus::Succeeded(
                report.result.unwrap_or(serde_json::Value::Null),
            )),
            "FAILURE" => {
                let reason = report
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE_REASON.to_string());
                Ok(TaskStatus::Failed(reason))
            }
            "REVOKED" => Ok(TaskStatus::Failed(REVOKED_REASON.to_string())),
            _ => Err(StatusParseError::UnknownState(report.status)),
        }
    }
}

impl TaskStatus {
    /// Classify a raw JSON status payload
    pub fn from_json(value: serde_json::Value) -> Result<Self, StatusParseError> {
        let report: TaskStatusReport = serde_json::from_value(value)
            .map_err(|e| StatusParseError::InvalidPayload(e.to_string()))?;
        TaskStatus::try_from(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pending_states() {
        for state in ["PENDING", "RECEIVED", "STARTED", "RETRY", "pending"] {
            let status = TaskStatus::from_json(json!({ "task_id": "t1", "status": state })).unwrap();
            assert_eq!(
                status,
                TaskStatus::Pending {
                    state: state.to_string()
                }
            );
        }
    }

    #[test]
    fn test_success_carries_result() {
        let status = TaskStatus::from_json(json!({
            "task_id": "t1",
            "status": "SUCCESS",
            "result": { "message": "Generated new CV" }
        }))
        .unwrap();

        assert_eq!(
            status,
            TaskStatus::Succeeded(json!({ "message": "Generated new CV" }))
        );
    }

    #[test]
    fn test_success_without_result_is_null() {
        let status = TaskStatus::from_json(json!({ "status": "SUCCESS" })).unwrap();
        assert_eq!(status, TaskStatus::Succeeded(serde_json::Value::Null));
    }

    #[test]
    fn test_failure_reason_and_default() {
        let status =
            TaskStatus::from_json(json!({ "status": "FAILURE", "error": "quota exceeded" })).unwrap();
        assert_eq!(status, TaskStatus::Failed("quota exceeded".to_string()));

        let status = TaskStatus::from_json(json!({ "status": "FAILURE", "error": "" })).unwrap();
        assert_eq!(status, TaskStatus::Failed(DEFAULT_FAILURE_REASON.to_string()));
    }

    #[test]
    fn test_revoked_is_failure() {
        let status = TaskStatus::from_json(json!({ "status": "REVOKED" })).unwrap();
        assert_eq!(status, TaskStatus::Failed(REVOKED_REASON.to_string()));
    }

    #[test]
    fn test_unknown_state_is_protocol_error() {
        let err = TaskStatus::from_json(json!({ "status": "EXPLODED" })).unwrap_err();
        assert_eq!(err, StatusParseError::UnknownState("EXPLODED".to_string()));
    }

    #[test]
    fn test_malformed_payloads_are_protocol_errors() {
        for payload in [json!({}), json!([]), json!("SUCCESS"), json!({ "status": 3 })] {
            let err = TaskStatus::from_json(payload).unwrap_err();
            assert!(matches!(err, StatusParseError::InvalidPayload(_)));
        }
    }

    #[test]
    fn test_classification_is_repeatable() {
        let payload = json!({ "task_id": "t9", "status": "STARTED" });
        let first = TaskStatus::from_json(payload.clone()).unwrap();
        let second = TaskStatus::from_json(payload).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_submission_accepts_camel_case_alias() {
        let submission: TaskSubmission =
            serde_json::from_value(json!({ "taskId": "t2" })).unwrap();
        assert_eq!(submission.handle().unwrap().as_str(), "t2");
        assert_eq!(submission.status, None);
    }

    #[test]
    fn test_submission_with_blank_id_has_no_handle() {
        let submission: TaskSubmission =
            serde_json::from_value(json!({ "task_id": "", "status": "PENDING" })).unwrap();
        assert_eq!(submission.handle(), Err(StatusParseError::EmptyTaskId));
    }
}
