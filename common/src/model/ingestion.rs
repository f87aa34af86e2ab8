use serde::{Deserialize, Serialize};

/// Result of submitting one batch to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchStatus {
    Committed,
    Failed { error: String },
}

/// Progress report emitted after each batch submission.
///
/// `batch_index` is zero-based. `committed` is cumulative across all batches
/// submitted so far and never includes records of a failed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionOutcome {
    pub batch_index: usize,
    pub batch_count: usize,
    pub batch_len: usize,
    pub committed: usize,
    pub total: usize,
    pub status: BatchStatus,
}

impl IngestionOutcome {
    /// Share of all valid records committed so far, in `[0, 100]`.
    pub fn percent(&self) -> f64 {
        progress_percent(self.committed, self.total)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, BatchStatus::Failed { .. })
    }
}

/// Final tally of a fully successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub committed: usize,
    pub batches: usize,
}

/// `committed / total` as a percentage; an empty run counts as complete.
pub fn progress_percent(committed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    committed as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_tracks_cumulative_commits() {
        assert!((progress_percent(50, 120) - 41.666).abs() < 0.01);
        assert!((progress_percent(100, 120) - 83.333).abs() < 0.01);
        assert_eq!(progress_percent(120, 120), 100.0);
        assert_eq!(progress_percent(0, 0), 100.0);
    }

    #[test]
    fn failed_status_is_tagged() {
        let outcome = IngestionOutcome {
            batch_index: 1,
            batch_count: 3,
            batch_len: 50,
            committed: 50,
            total: 120,
            status: BatchStatus::Failed {
                error: "disk full".into(),
            },
        };
        assert!(outcome.is_failure());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"]["status"], "failed");
        assert_eq!(json["status"]["error"], "disk full");
    }
}
