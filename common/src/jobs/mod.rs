use serde::{Deserialize, Serialize};

/// Lifecycle of a background ingestion job, as polled by clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    /// Whole-number percentage of valid records committed so far.
    InProgress(u32),
    Completed(String),
    /// A batch was rejected by the store. Batches before it stay committed;
    /// batches after it were never attempted.
    Aborted {
        batch_index: usize,
        committed: usize,
        total: usize,
        error: String,
    },
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed(_) | JobStatus::Aborted { .. } | JobStatus::Failed(_)
        )
    }
}
