//! HTTP endpoints for uploading site files.
//!
//! - `POST /api/sites/validate`: multipart upload with a `file` part. Parses
//!   and validates the file without persisting anything and returns the
//!   report, a truncated text summary and the file's MD5.
//!
//! - `POST /api/sites/ingest`: multipart upload with a `json` part holding the
//!   `IngestRequest` (the uploader identity) followed by the `file` part. The
//!   file is validated afresh; a file with any error is answered with
//!   `422 Unprocessable Entity` and its report. A valid file is split into
//!   batches and handed to a background job whose id is returned at once.
//!
//! - `GET /api/sites/status/{job_id}`: current `JobStatus` of an ingest job.
//!
//! - `GET /api/sites/template`: the CSV template listing every recognised
//!   column with one example row.

use crate::error::{PipelineError, UploadError};
use crate::pipeline::report::render_report;
use actix_web::web::{get, post, scope};
use actix_web::{HttpResponse, Scope};
use common::requests::ValidateResponse;

mod get_status;
mod ingest;
mod template;
mod upload;
mod validate;

const API_PATH: &str = "/api/sites";

/// Configures and returns the Actix scope for site upload routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/validate", post().to(validate::process))
        .route("/ingest", post().to(ingest::process))
        .route("/status/{job_id}", get().to(get_status::process))
        .route("/template", get().to(template::process))
}

fn upload_error_response(err: &UploadError) -> HttpResponse {
    match err {
        UploadError::TooLarge { .. } => HttpResponse::PayloadTooLarge().body(err.to_string()),
        _ => HttpResponse::BadRequest().body(err.to_string()),
    }
}

/// Maps a failed pipeline run to the response a client should see.
fn pipeline_error_response(err: PipelineError, file_md5: String) -> HttpResponse {
    match err {
        PipelineError::Upload(err) => upload_error_response(&err),
        PipelineError::Parse(err) => HttpResponse::BadRequest().body(err.to_string()),
        PipelineError::Invalid(report) => {
            let summary = render_report(&report);
            HttpResponse::UnprocessableEntity().json(ValidateResponse {
                report: *report,
                summary,
                file_md5,
            })
        }
        PipelineError::Ingest(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}
