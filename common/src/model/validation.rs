//! Outcome of checking an uploaded file against the site schema.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Disqualifies the row, and therefore the file, from ingestion.
    Error,
    /// Reported to the user; the row is still ingested.
    Warning,
}

/// A single validation issue.
///
/// `row` is `None` for document-level findings (empty file, missing
/// columns); `field` is `None` when the finding is not tied to a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub row: Option<usize>,
    pub field: Option<String>,
    pub message: String,
    pub severity: Severity,
}

impl Finding {
    pub fn error(row: usize, field: &str, message: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            field: Some(field.to_string()),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(row: usize, field: &str, message: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            field: Some(field.to_string()),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    /// A file-wide error, optionally naming the column it concerns.
    pub fn document(field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            row: None,
            field: field.map(str::to_string),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.row, &self.field) {
            (Some(row), Some(field)) => write!(f, "Row {row}, {field}: {}", self.message),
            (Some(row), None) => write!(f, "Row {row}: {}", self.message),
            (None, _) => f.write_str(&self.message),
        }
    }
}

/// Aggregate result of validating every row of a file.
///
/// A row counts as valid when it has no error-severity finding; warnings do
/// not affect it. `is_valid` holds only when there are no errors at all,
/// document-level ones included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub row_count: usize,
    pub valid_rows: usize,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Indices of rows carrying at least one error.
    pub fn rows_with_errors(&self) -> BTreeSet<usize> {
        self.errors.iter().filter_map(|f| f.row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_display_includes_location() {
        let e = Finding::error(2, "latitude", "Invalid latitude (91)");
        assert_eq!(e.to_string(), "Row 2, latitude: Invalid latitude (91)");
        let d = Finding::document(Some("site_name"), "missing required column: site_name");
        assert_eq!(d.to_string(), "missing required column: site_name");
        assert!(d.is_error());
    }

    #[test]
    fn report_serializes_with_camel_case_counts() {
        let report = ValidationReport {
            is_valid: true,
            row_count: 1,
            valid_rows: 1,
            errors: vec![],
            warnings: vec![Finding::warning(2, "risk_status", "Invalid risk_status (Medium)")],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rowCount"], 1);
        assert_eq!(json["validRows"], 1);
        assert_eq!(json["warnings"][0]["severity"], "warning");
    }

    #[test]
    fn rows_with_errors_ignores_document_findings() {
        let report = ValidationReport {
            is_valid: false,
            row_count: 3,
            valid_rows: 1,
            errors: vec![
                Finding::document(Some("latitude"), "missing required column: latitude"),
                Finding::error(2, "latitude", "Missing required field: latitude"),
                Finding::error(4, "latitude", "Missing required field: latitude"),
            ],
            warnings: vec![],
        };
        assert_eq!(report.rows_with_errors().into_iter().collect::<Vec<_>>(), vec![2, 4]);
        assert!(!report.rows_with_errors().contains(&3));
    }
}
