//! The site upload pipeline: parse, validate, batch, ingest.
//!
//! Each stage takes an immutable input and returns a new value; nothing is
//! shared between stages. A file is ingested only when its validation report
//! has no errors at all, and the caller can drop the pipeline at any point
//! before [`ingestor::ingest`] starts without anything having been persisted.

pub mod batcher;
pub mod ingestor;
pub mod parser;
pub mod report;
pub mod validator;

use crate::error::PipelineError;
use crate::store::SiteStore;
use common::model::ingestion::{IngestSummary, IngestionOutcome};
use common::model::site::{RawRow, SiteRecord};
use common::model::validation::ValidationReport;
use log::{info, warn};

/// Hard ceiling on uploaded file size: 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// An uploaded file as received from the client.
#[derive(Debug, Clone, Copy)]
pub struct Upload<'a> {
    pub bytes: &'a [u8],
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
}

impl<'a> Upload<'a> {
    pub fn csv(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            filename: Some("upload.csv"),
            content_type: Some("text/csv"),
        }
    }
}

/// A validated upload, ready to be handed to the ingestor.
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    pub report: ValidationReport,
    pub batches: Vec<Vec<SiteRecord>>,
}

impl PreparedUpload {
    pub fn record_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

/// Checks, parses and validates an upload without touching the store.
pub fn validate_upload(
    upload: &Upload<'_>,
    limit: usize,
) -> Result<(Vec<RawRow>, ValidationReport), PipelineError> {
    parser::check_upload(
        upload.filename,
        upload.content_type,
        upload.bytes.len(),
        limit,
    )?;
    let rows = parser::parse_rows(upload.bytes)?;
    let report = validator::validate(&rows);
    Ok((rows, report))
}

/// Validates an upload and, if it is free of errors, builds its batches.
///
/// An upload with any error is returned as [`PipelineError::Invalid`]
/// carrying the full report.
pub fn prepare(
    upload: &Upload<'_>,
    limit: usize,
    uploader: &str,
) -> Result<PreparedUpload, PipelineError> {
    let (rows, report) = validate_upload(upload, limit)?;
    if !report.is_valid {
        warn!(
            "upload rejected: {} errors across {} rows",
            report.error_count(),
            report.row_count
        );
        return Err(PipelineError::Invalid(Box::new(report)));
    }
    let batches = batcher::prepare_batches(rows, &report, uploader);
    info!(
        "upload from {} validated: {} rows, {} warnings, {} batches",
        uploader,
        report.row_count,
        report.warning_count(),
        batches.len()
    );
    Ok(PreparedUpload { report, batches })
}

/// Runs the whole pipeline for one upload, reporting after every batch.
pub fn run_upload<S, F>(
    upload: &Upload<'_>,
    limit: usize,
    uploader: &str,
    store: &mut S,
    on_outcome: F,
) -> Result<IngestSummary, PipelineError>
where
    S: SiteStore + ?Sized,
    F: FnMut(&IngestionOutcome),
{
    let prepared = prepare(upload, limit, uploader)?;
    Ok(ingestor::ingest(&prepared.batches, store, on_outcome)?)
}
