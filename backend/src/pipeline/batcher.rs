//! Normalizes valid rows and splits them into fixed-size batches.

use super::validator::{parse_coordinate, parse_number, LATITUDE_RANGE, LONGITUDE_RANGE};
use common::model::site::{RawRow, SiteRecord};
use common::model::validation::ValidationReport;
use log::{debug, warn};

/// Number of records submitted to the store per insert.
pub const BATCH_SIZE: usize = 50;

/// Builds records for every row the report marks valid, in input order,
/// then partitions them into batches of [`BATCH_SIZE`].
pub fn prepare_batches(
    rows: Vec<RawRow>,
    report: &ValidationReport,
    uploader: &str,
) -> Vec<Vec<SiteRecord>> {
    let records = normalize(rows, report, uploader);
    let batches = partition(records, BATCH_SIZE);
    debug!("prepared {} batches for {}", batches.len(), uploader);
    batches
}

/// Converts the rows without error findings into records.
pub fn normalize(rows: Vec<RawRow>, report: &ValidationReport, uploader: &str) -> Vec<SiteRecord> {
    let rejected = report.rows_with_errors();
    rows.into_iter()
        .filter(|row| !rejected.contains(&row.index))
        .filter_map(|row| {
            let record = normalize_row(&row, uploader);
            if record.is_none() {
                warn!("row {} passed validation but could not be normalized; skipped", row.index);
            }
            record
        })
        .collect()
}

/// Trims and coerces one row.
///
/// Returns `None` when the required fields do not hold; callers only pass
/// rows that validated without errors. Blank optional values become `None`,
/// as do enumerated values outside their set and unparsable numbers.
pub fn normalize_row(row: &RawRow, uploader: &str) -> Option<SiteRecord> {
    let text = |column: &str| row.trimmed(column).map(str::to_string);
    let number = |column: &str| row.trimmed(column).and_then(parse_number);

    Some(SiteRecord {
        site_name: row.trimmed("site_name")?.to_string(),
        latitude: parse_coordinate(row.trimmed("latitude")?, LATITUDE_RANGE)?,
        longitude: parse_coordinate(row.trimmed("longitude")?, LONGITUDE_RANGE)?,
        risk_status: row.trimmed("risk_status").and_then(|v| v.parse().ok()),
        site_type: text("site_type"),
        authority: text("authority"),
        summer_capacity: number("summer_capacity"),
        winter_capacity: number("winter_capacity"),
        functional_location: text("functional_location"),
        licence_area: text("licence_area"),
        power_transformers: text("power_transformers"),
        site_voltage: text("site_voltage"),
        what3words: text("what3words"),
        r#type: text("type"),
        voltage_transformer_ratings: text("voltage_transformer_ratings"),
        connection_queue: text("connection_queue"),
        uploaded_by: uploader.to_string(),
    })
}

/// Splits `records` into consecutive groups of `size`, keeping order. The
/// last group may be shorter. A `size` of zero is treated as one.
pub fn partition<T>(records: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut batches = Vec::with_capacity(records.len().div_ceil(size));
    let mut iter = records.into_iter().peekable();
    while iter.peek().is_some() {
        batches.push(iter.by_ref().take(size).collect());
    }
    batches
}
