//! # Site Ingest Job
//!
//! `POST /api/sites/ingest` validates an upload and, when it carries no
//! errors, queues it for insertion into the site store.
//!
//! ## Workflow
//!
//! 1. The multipart body is read; the `json` part (`IngestRequest`) must come
//!    before the `file` part so the uploader is known.
//! 2. The file is parsed, validated and split into batches on the blocking
//!    pool. Any error finding ends the request with `422` and the report.
//! 3. A job is registered as `Pending` and its id returned immediately.
//! 4. A blocking worker opens the store and submits the batches one by one,
//!    sending `InProgress(percent)` after each committed batch and a final
//!    `Completed`, `Aborted` or `Failed` status. Every update goes through the
//!    job controller channel, so clients polling `/status/{job_id}` observe a
//!    non-decreasing percentage.

use super::upload::read_upload;
use super::{pipeline_error_response, upload_error_response};
use crate::config::AppConfig;
use crate::error::UploadError;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::pipeline::{self, ingestor, PreparedUpload};
use crate::store::SqliteSiteStore;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::jobs::JobStatus;
use common::model::site::SiteRecord;
use common::requests::IngestAccepted;
use log::{error, info};
use tokio::sync::mpsc;

pub(crate) async fn process(
    payload: Multipart,
    config: web::Data<AppConfig>,
    jobs_state: web::Data<JobsState>,
) -> impl Responder {
    let received = match read_upload(payload, config.max_upload_bytes, true).await {
        Ok(received) => received,
        Err(err) => return upload_error_response(&err),
    };
    let Some(uploader) = received.uploader() else {
        return upload_error_response(&UploadError::MissingUploader);
    };
    let limit = config.max_upload_bytes;
    let file_md5 = received.md5.clone();

    let result =
        web::block(move || pipeline::prepare(&received.as_upload(), limit, &uploader)).await;
    let prepared = match result {
        Ok(Ok(prepared)) => prepared,
        Ok(Err(err)) => return pipeline_error_response(err, file_md5),
        Err(err) => {
            return HttpResponse::InternalServerError().body(format!("join error: {}", err))
        }
    };

    let accepted =
        schedule_ingest_job(&jobs_state, config.database_path.clone(), prepared, file_md5).await;
    HttpResponse::Accepted().json(accepted)
}

/// Registers the job and spawns its worker. Returns without waiting for it.
async fn schedule_ingest_job(
    jobs_state: &JobsState,
    database_path: String,
    prepared: PreparedUpload,
    file_md5: String,
) -> IngestAccepted {
    let job_id = jobs_state.register().await;
    let accepted = IngestAccepted {
        job_id: job_id.clone(),
        valid_rows: prepared.record_count(),
        batches: prepared.batches.len(),
        file_md5,
    };
    info!(
        "scheduled ingest job {} for {} records in {} batches",
        job_id, accepted.valid_rows, accepted.batches
    );

    let tx = jobs_state.tx.clone();
    tokio::spawn(async move {
        let worker_tx = tx.clone();
        let worker_job_id = job_id.clone();
        let batches = prepared.batches;
        let handle = tokio::task::spawn_blocking(move || {
            run_ingest_job(&worker_tx, &worker_job_id, &database_path, &batches)
        });

        let status = match handle.await {
            Ok(status) => status,
            Err(join_err) => JobStatus::Failed(format!("join error: {}", join_err)),
        };
        let _ = tx.send(JobUpdate { job_id, status }).await;
    });

    accepted
}

/// Runs on the blocking pool. Returns the job's terminal status.
fn run_ingest_job(
    tx: &mpsc::Sender<JobUpdate>,
    job_id: &str,
    database_path: &str,
    batches: &[Vec<SiteRecord>],
) -> JobStatus {
    let mut store = match SqliteSiteStore::open(database_path) {
        Ok(store) => store,
        Err(err) => {
            error!("job {}: cannot open site store: {}", job_id, err);
            return JobStatus::Failed(format!("cannot open site store: {}", err));
        }
    };

    let _ = tx.blocking_send(JobUpdate {
        job_id: job_id.to_string(),
        status: JobStatus::InProgress(0),
    });

    let result = ingestor::ingest(batches, &mut store, |outcome| {
        if outcome.is_failure() {
            return;
        }
        let _ = tx.blocking_send(JobUpdate {
            job_id: job_id.to_string(),
            status: JobStatus::InProgress(outcome.percent().floor() as u32),
        });
    });

    match result {
        Ok(summary) => JobStatus::Completed(format!(
            "Ingested {} sites in {} batches",
            summary.committed, summary.batches
        )),
        Err(err) => JobStatus::Aborted {
            batch_index: err.batch_index,
            committed: err.committed,
            total: err.total,
            error: err.source.to_string(),
        },
    }
}
