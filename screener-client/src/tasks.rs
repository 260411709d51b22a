//! Task-related API endpoints

use reqwest::Method;
use screener_core::domain::job::JobSpec;
use screener_core::domain::task::{TaskHandle, TaskStatus};
use screener_core::dto::task::TaskSubmission;

use crate::error::{Result, TransportError};
use crate::transport::Transport;
use crate::BackendClient;

/// Submit a job and return the handle of the task the backend started
///
/// Never retried: the submission endpoint is not idempotent.
pub async fn submit_job<T: Transport + ?Sized>(transport: &T, spec: &JobSpec) -> Result<TaskHandle> {
    let body = transport.send(Method::POST, &spec.submit_path, None).await?;

    let submission: TaskSubmission = serde_json::from_value(body).map_err(|e| {
        TransportError::MalformedResponse(format!("Invalid submission response: {}", e))
    })?;

    Ok(submission.handle()?)
}

/// Fetch and classify the current status of a task
///
/// Safe to call repeatedly.
pub async fn fetch_status<T: Transport + ?Sized>(
    transport: &T,
    handle: &TaskHandle,
) -> Result<TaskStatus> {
    let body = transport
        .send(Method::GET, &status_path(handle), None)
        .await?;

    Ok(TaskStatus::from_json(body)?)
}

/// Path of the status endpoint for a task
pub fn status_path(handle: &TaskHandle) -> String {
    format!("/tasks/{}", handle)
}

impl BackendClient {
    // =============================================================================
    // Task Lifecycle
    // =============================================================================

    /// Submit a job
    ///
    /// # Example
    /// ```no_run
    /// # use screener_client::BackendClient;
    /// # use screener_core::domain::job::JobSpec;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = BackendClient::new("http://localhost:8000");
    /// let specs = JobSpec::builtin();
    /// let handle = client.submit_job(&specs[0]).await?;
    /// println!("Started task {}", handle);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_job(&self, spec: &JobSpec) -> Result<TaskHandle> {
        submit_job(self, spec).await
    }

    /// Get the classified status of a task
    pub async fn task_status(&self, handle: &TaskHandle) -> Result<TaskStatus> {
        fetch_status(self, handle).await
    }
}
