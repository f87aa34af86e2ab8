//! Tracks background ingestion jobs.
//!
//! Ingestion runs outside the request/response cycle. The HTTP handler
//! registers a job as `Pending` and returns its id; the worker then reports
//! every status change as a [`JobUpdate`] over an MPSC channel, and
//! [`start_job_updater`] applies those updates to the shared map that the
//! status endpoint reads.
//!
//! All updates of a job travel over the same channel, so they are applied
//! in the order the worker sent them.

use common::jobs::JobStatus;
use log::debug;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// Shared state of all jobs, cloned into every worker and handler.
#[derive(Clone)]
pub struct JobsState {
    /// Job id to current status. Read by the status endpoint, written by
    /// [`JobsState::register`] and the updater task.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Sender half of the update channel consumed by [`start_job_updater`].
    pub tx: mpsc::Sender<JobUpdate>,
}

/// A status change for one job.
#[derive(Debug)]
pub struct JobUpdate {
    pub job_id: String,
    pub status: JobStatus,
}

impl JobsState {
    /// Creates the state together with the receiver its updater must drain.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(capacity);
        let state = Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    /// Registers a new `Pending` job and returns its id.
    pub async fn register(&self) -> String {
        let job_id = uuid::Uuid::new_v4().to_string();
        self.jobs
            .write()
            .await
            .insert(job_id.clone(), JobStatus::Pending);
        job_id
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }
}

/// Applies job updates until every sender has been dropped.
///
/// A job that reached a terminal status keeps it; late updates are ignored.
pub async fn start_job_updater(
    jobs: Arc<RwLock<HashMap<String, JobStatus>>>,
    mut rx: mpsc::Receiver<JobUpdate>,
) {
    while let Some(update) = rx.recv().await {
        let mut map = jobs.write().await;
        if map.get(&update.job_id).is_some_and(JobStatus::is_terminal) {
            debug!("ignoring update for finished job {}", update.job_id);
            continue;
        }
        map.insert(update.job_id, update.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn updates_are_applied_in_order_and_terminal_status_sticks() {
        let (state, rx) = JobsState::new(8);
        let job_id = state.register().await;
        assert_eq!(state.status(&job_id).await, Some(JobStatus::Pending));

        let tx = state.tx.clone();
        for status in [
            JobStatus::InProgress(50),
            JobStatus::Completed("done".into()),
            JobStatus::InProgress(10),
        ] {
            tx.send(JobUpdate {
                job_id: job_id.clone(),
                status,
            })
            .await
            .unwrap();
        }
        drop(tx);

        // The updater returns once every sender, including the one held by
        // the state itself, is gone.
        let JobsState { jobs, tx } = state;
        drop(tx);
        start_job_updater(jobs.clone(), rx).await;

        let status = jobs.read().await.get(&job_id).cloned();
        assert_eq!(status, Some(JobStatus::Completed("done".into())));
    }

    #[tokio::test]
    async fn unknown_job_has_no_status() {
        let (state, _rx) = JobsState::new(1);
        assert_eq!(state.status("missing").await, None);
    }
}
