//! Error taxonomy of the upload pipeline.
//!
//! Upload, parse and schema failures are terminal and surface before any row
//! is examined. Row-level problems are not errors in this sense: they are
//! collected as findings in the `ValidationReport`. An ingest failure is
//! terminal for the remaining batches and carries how far ingestion got.

use common::model::validation::ValidationReport;
use thiserror::Error;

/// The file was refused before parsing started.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file exceeds the {limit} byte limit ({size} bytes received)")]
    TooLarge { size: usize, limit: usize },

    #[error("unsupported file type: {0} (expected a .csv file)")]
    UnsupportedContentType(String),

    #[error("missing file")]
    MissingFile,

    #[error("uploader metadata must be sent before the file")]
    MissingUploader,

    #[error("invalid upload metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("upload stream error: {0}")]
    Transport(String),
}

/// Malformed CSV. `line` is 1-based.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed CSV at line {line}: {message}")]
pub struct ParseError {
    pub line: u64,
    pub message: String,
}

impl ParseError {
    pub fn new(line: u64, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(1);
        match err.into_kind() {
            csv::ErrorKind::Utf8 { err, .. } => {
                ParseError::new(line, format!("invalid UTF-8: {err}"))
            }
            csv::ErrorKind::Io(err) => ParseError::new(line, err.to_string()),
            other => ParseError::new(line, format!("{other:?}")),
        }
    }
}

/// The header row lacks a column the schema requires.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),
}

/// Failure reported by the persistence collaborator for a single batch.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("batch rejected: {0}")]
    Rejected(String),
}

/// A batch failed; earlier batches remain committed, later ones were never
/// attempted. `batch_index` is zero-based.
#[derive(Debug, Error)]
#[error("batch {} of {batch_count} failed after {committed} of {total} records were committed: {source}", .batch_index + 1)]
pub struct IngestError {
    pub batch_index: usize,
    pub batch_count: usize,
    pub committed: usize,
    pub total: usize,
    #[source]
    pub source: StoreError,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("file failed validation with {} error(s)", .0.error_count())]
    Invalid(Box<ValidationReport>),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_error_reports_one_based_batch() {
        let err = IngestError {
            batch_index: 1,
            batch_count: 3,
            committed: 50,
            total: 120,
            source: StoreError::Rejected("constraint violation".into()),
        };
        assert_eq!(
            err.to_string(),
            "batch 2 of 3 failed after 50 of 120 records were committed: batch rejected: constraint violation"
        );
    }

    #[test]
    fn schema_error_message_matches_finding_text() {
        let err = SchemaError::MissingColumn("latitude".into());
        assert_eq!(err.to_string(), "missing required column: latitude");
    }
}
