//! Checks parsed rows against the site schema.
//!
//! Missing or malformed identity and location data (name and coordinates)
//! are errors and block ingestion of the whole file. Unexpected categorical
//! values and unparsable capacities are warnings: reported, but the row is
//! still ingested. Findings are collected for every row so the user sees all
//! problems of a file in one pass.

use crate::error::SchemaError;
use common::model::schema::{self, FieldDefinition, FieldKind, SITE_FIELDS};
use common::model::site::RawRow;
use common::model::validation::{Finding, ValidationReport};
use log::debug;
use std::ops::RangeInclusive;

pub const EMPTY_FILE_MESSAGE: &str = "file is empty";

pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Validates every row. Pure: the same rows always yield the same report.
pub fn validate(rows: &[RawRow]) -> ValidationReport {
    let Some(first) = rows.first() else {
        return ValidationReport {
            is_valid: false,
            row_count: 0,
            valid_rows: 0,
            errors: vec![Finding::document(None, EMPTY_FILE_MESSAGE)],
            warnings: Vec::new(),
        };
    };

    let mut errors: Vec<Finding> = check_columns(first)
        .into_iter()
        .map(|err| match &err {
            SchemaError::MissingColumn(column) => {
                Finding::document(Some(column.as_str()), err.to_string())
            }
        })
        .collect();
    let mut warnings = Vec::new();
    let mut valid_rows = 0;

    for row in rows {
        let findings = check_row(row);
        if !findings.iter().any(Finding::is_error) {
            valid_rows += 1;
        }
        for finding in findings {
            if finding.is_error() {
                errors.push(finding);
            } else {
                warnings.push(finding);
            }
        }
    }

    debug!(
        "validated {} rows: {} valid, {} errors, {} warnings",
        rows.len(),
        valid_rows,
        errors.len(),
        warnings.len()
    );

    ValidationReport {
        is_valid: errors.is_empty(),
        row_count: rows.len(),
        valid_rows,
        errors,
        warnings,
    }
}

/// Required columns absent from the header, in registry order.
///
/// The header set is taken from the first row's keys; every row carries all
/// header columns.
pub fn check_columns(first: &RawRow) -> Vec<SchemaError> {
    schema::required_fields()
        .filter(|field| !first.has_column(field.name))
        .map(|field| SchemaError::MissingColumn(field.name.to_string()))
        .collect()
}

/// Findings for one row, in registry field order.
pub fn check_row(row: &RawRow) -> Vec<Finding> {
    SITE_FIELDS
        .iter()
        .filter_map(|field| match row.trimmed(field.name) {
            Some(value) => check_value(row.index, field, value),
            None if field.required => Some(Finding::error(
                row.index,
                field.name,
                format!("Missing required field: {}", field.name),
            )),
            None => None,
        })
        .collect()
}

fn check_value(index: usize, field: &FieldDefinition, value: &str) -> Option<Finding> {
    match field.kind {
        FieldKind::Text => None,
        FieldKind::Latitude => parse_coordinate(value, LATITUDE_RANGE)
            .is_none()
            .then(|| Finding::error(index, field.name, format!("Invalid latitude ({value})"))),
        FieldKind::Longitude => parse_coordinate(value, LONGITUDE_RANGE)
            .is_none()
            .then(|| Finding::error(index, field.name, format!("Invalid longitude ({value})"))),
        FieldKind::Enumerated(allowed) => (!allowed.contains(&value)).then(|| {
            Finding::warning(
                index,
                field.name,
                format!(
                    "Invalid {} ({value}), expected one of: {}",
                    field.name,
                    allowed.join(", ")
                ),
            )
        }),
        FieldKind::Numeric => parse_number(value).is_none().then(|| {
            Finding::warning(
                index,
                field.name,
                format!("Invalid {} ({value}), expected a number", field.name),
            )
        }),
    }
}

/// Parses a finite decimal number. The whole trimmed value must parse.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a coordinate and checks it lies within `range`.
pub fn parse_coordinate(value: &str, range: RangeInclusive<f64>) -> Option<f64> {
    parse_number(value).filter(|v| range.contains(v))
}
