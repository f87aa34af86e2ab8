use crate::model::validation::ValidationReport;
use serde::{Deserialize, Serialize};

/// Metadata part of an ingest upload; must precede the `file` part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Identity stamped on every record of the upload.
    pub uploader: String,
}

/// Response of the dry-run validation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub report: ValidationReport,
    /// Human-readable rendering of the report, truncated for large files.
    pub summary: String,
    /// MD5 of the uploaded bytes, hex encoded.
    pub file_md5: String,
}

/// Returned when a valid upload has been queued for ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestAccepted {
    pub job_id: String,
    pub valid_rows: usize,
    pub batches: usize,
    pub file_md5: String,
}
