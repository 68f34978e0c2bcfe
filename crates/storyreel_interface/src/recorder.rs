//! Persistence seam for run records.

use async_trait::async_trait;
use std::path::PathBuf;
use storyreel_core::{RunRequest, RunStatus};
use storyreel_error::StoryreelResult;

/// Terminal result of a run as handed to the recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Final status
    pub status: RunStatus,
    /// Artifact path on success
    pub artifact: Option<PathBuf>,
    /// Failure reason
    pub error: Option<String>,
}

impl RunOutcome {
    /// Successful outcome.
    pub fn completed(artifact: PathBuf) -> Self {
        Self {
            status: RunStatus::Completed,
            artifact: Some(artifact),
            error: None,
        }
    }

    /// Failed or cancelled outcome.
    pub fn failed(status: RunStatus, reason: impl Into<String>) -> Self {
        Self {
            status,
            artifact: None,
            error: Some(reason.into()),
        }
    }
}

/// Stores run records for an external system.
///
/// Errors returned here are logged by the pipeline and never escalated.
#[async_trait]
pub trait RunRecorder: Send + Sync {
    /// A run was accepted and is now processing.
    async fn record_started(&self, request: &RunRequest) -> StoryreelResult<()>;

    /// A run reached a terminal state.
    async fn record_finished(
        &self,
        request: &RunRequest,
        outcome: &RunOutcome,
    ) -> StoryreelResult<()>;
}
