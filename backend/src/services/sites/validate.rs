use super::upload::read_upload;
use super::{pipeline_error_response, upload_error_response};
use crate::config::AppConfig;
use crate::pipeline::{self, report::render_report};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::requests::ValidateResponse;
use log::info;

/// Dry-run validation of an uploaded file.
///
/// - `200 OK` with a `ValidateResponse` once the file could be parsed, whether
///   or not it is valid; `report.isValid` tells which.
/// - `400 Bad Request` for malformed CSV or a non-CSV upload.
/// - `413 Payload Too Large` past the upload ceiling.
pub(crate) async fn process(payload: Multipart, config: web::Data<AppConfig>) -> impl Responder {
    let received = match read_upload(payload, config.max_upload_bytes, false).await {
        Ok(received) => received,
        Err(err) => return upload_error_response(&err),
    };
    let limit = config.max_upload_bytes;
    let file_md5 = received.md5.clone();

    let result = web::block(move || pipeline::validate_upload(&received.as_upload(), limit)).await;
    match result {
        Ok(Ok((_, report))) => {
            info!(
                "validated upload {}: {} rows, valid = {}",
                file_md5, report.row_count, report.is_valid
            );
            let summary = render_report(&report);
            HttpResponse::Ok().json(ValidateResponse {
                report,
                summary,
                file_md5,
            })
        }
        Ok(Err(err)) => pipeline_error_response(err, file_md5),
        Err(err) => HttpResponse::InternalServerError().body(format!("join error: {}", err)),
    }
}
