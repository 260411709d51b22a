//! Job domain types

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Named category of long-running backend operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobKind(Cow<'static, str>);

impl JobKind {
    /// Generate a CV document with the configured text and image providers
    pub const GENERATE_CV: JobKind = JobKind(Cow::Borrowed("generate-cv"));
    /// Generate a CV document with the mock providers
    pub const GENERATE_MOCK_CV: JobKind = JobKind(Cow::Borrowed("generate-mock-cv"));
    /// Rebuild the retrieval index from the stored CVs
    pub const INGEST: JobKind = JobKind(Cow::Borrowed("ingest"));

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobKind {
    fn from(name: &str) -> Self {
        JobKind::new(name)
    }
}

/// How to submit one job kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub kind: JobKind,
    /// Path of the submission endpoint, relative to the backend base URL
    pub submit_path: String,
    pub description: String,
}

impl JobSpec {
    pub fn new(
        kind: JobKind,
        submit_path: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            submit_path: submit_path.into(),
            description: description.into(),
        }
    }

    /// The job kinds the backend exposes out of the box
    pub fn builtin() -> Vec<JobSpec> {
        vec![
            JobSpec::new(JobKind::GENERATE_CV, "/cv/generate", "Generate a new CV PDF"),
            JobSpec::new(
                JobKind::GENERATE_MOCK_CV,
                "/cv/generate-mock",
                "Generate a CV PDF with mock providers",
            ),
            JobSpec::new(JobKind::INGEST, "/rag/ingest", "Rebuild the RAG index from CV PDFs"),
        ]
    }
}
