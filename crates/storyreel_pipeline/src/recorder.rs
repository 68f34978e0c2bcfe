//! In-memory run records.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use storyreel_core::{OwnerId, RunId, RunRequest, RunStatus};
use storyreel_error::StoryreelResult;
use storyreel_interface::{RunOutcome, RunRecorder};

/// What the recorder knows about one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    /// Run owner
    pub owner: Option<OwnerId>,
    /// Prompt or story text
    pub prompt: String,
    /// Latest status
    pub status: RunStatus,
    /// Artifact path once completed
    pub artifact: Option<PathBuf>,
    /// Failure reason
    pub error: Option<String>,
}

/// [`RunRecorder`] keeping records in memory.
#[derive(Debug, Default)]
pub struct InMemoryRunRecorder {
    records: Mutex<HashMap<RunId, RunRecord>>,
}

impl InMemoryRunRecorder {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record of one run.
    pub fn get(&self, run_id: &RunId) -> Option<RunRecord> {
        self.records
            .lock()
            .ok()
            .and_then(|records| records.get(run_id).cloned())
    }

    /// Number of runs seen.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// True when no run was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RunRecorder for InMemoryRunRecorder {
    async fn record_started(&self, request: &RunRequest) -> StoryreelResult<()> {
        if let Ok(mut records) = self.records.lock() {
            records.insert(
                request.run_id.clone(),
                RunRecord {
                    owner: request.owner.clone(),
                    prompt: request.source_text.clone(),
                    status: RunStatus::Processing,
                    artifact: None,
                    error: None,
                },
            );
        }
        Ok(())
    }

    async fn record_finished(
        &self,
        request: &RunRequest,
        outcome: &RunOutcome,
    ) -> StoryreelResult<()> {
        if let Ok(mut records) = self.records.lock() {
            let record = records
                .entry(request.run_id.clone())
                .or_insert_with(|| RunRecord {
                    owner: request.owner.clone(),
                    prompt: request.source_text.clone(),
                    status: RunStatus::Processing,
                    artifact: None,
                    error: None,
                });
            record.status = outcome.status;
            record.artifact = outcome.artifact.clone();
            record.error = outcome.error.clone();
        }
        Ok(())
    }
}
