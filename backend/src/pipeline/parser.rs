//! Turns uploaded bytes into header-keyed rows.
//!
//! The first non-empty line is the header. Every following non-empty line is
//! a data row aligned to the header by column position: short rows get empty
//! strings for the missing cells, surplus cells are dropped. Empty lines,
//! including whitespace-only ones, are skipped and do not consume a row
//! number. A line of bare separators such as `,,` is a data row with blank
//! cells. `\n`, `\r\n` and a lone `\r` all end a line.

use crate::error::{ParseError, UploadError};
use common::model::site::RawRow;
use csv::ReaderBuilder;
use log::debug;
use std::collections::BTreeMap;

/// Declared content types accepted as CSV. Browsers commonly label `.csv`
/// files with the spreadsheet or plain-text types.
pub const CSV_CONTENT_TYPES: &[&str] = &[
    "text/csv",
    "application/csv",
    "application/vnd.ms-excel",
    "text/plain",
];

/// Refuses an upload before parsing when it is too large or not a CSV file.
///
/// A `.csv` filename or one of [`CSV_CONTENT_TYPES`] is enough to accept the
/// type; `application/octet-stream` is treated as undeclared.
pub fn check_upload(
    filename: Option<&str>,
    content_type: Option<&str>,
    size: usize,
    limit: usize,
) -> Result<(), UploadError> {
    if size > limit {
        return Err(UploadError::TooLarge { size, limit });
    }

    let has_csv_name = filename
        .map(|f| f.trim().to_ascii_lowercase().ends_with(".csv"))
        .unwrap_or(false);
    let declared = content_type
        .map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

    match declared {
        Some(ct) if CSV_CONTENT_TYPES.contains(&ct.as_str()) => Ok(()),
        Some(ct) if !has_csv_name => Err(UploadError::UnsupportedContentType(ct)),
        Some(_) => Ok(()),
        None if has_csv_name => Ok(()),
        None => Err(UploadError::UnsupportedContentType(
            filename.unwrap_or("unnamed file").to_string(),
        )),
    }
}

/// Parses CSV bytes into rows. Fails as a whole; no partial output.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<RawRow>, ParseError> {
    check_quotes(bytes)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        if is_empty_line(&record) {
            continue;
        }

        let Some(columns) = headers.as_ref() else {
            headers = Some(
                record
                    .iter()
                    .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
                    .collect(),
            );
            continue;
        };

        let values: BTreeMap<String, String> = columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.is_empty())
            .map(|(i, name)| (name.clone(), record.get(i).unwrap_or_default().to_string()))
            .collect();

        // Header is row 1, so the n-th data row (0-based) is row n + 2.
        rows.push(RawRow::new(rows.len() + 2, values));
    }

    debug!(
        "parsed {} data rows across {} columns",
        rows.len(),
        headers.as_ref().map(Vec::len).unwrap_or(0)
    );
    Ok(rows)
}

fn is_empty_line(record: &csv::StringRecord) -> bool {
    record.len() == 1 && record[0].trim().is_empty()
}

/// Rejects input with a quoted field that is never closed. The csv reader
/// would otherwise swallow the rest of the file into that field.
fn check_quotes(bytes: &[u8]) -> Result<(), ParseError> {
    let mut line = 1u64;
    let mut opened_at = 1u64;
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_quotes {
            match b {
                b'"' if bytes.get(i + 1) == Some(&b'"') => i += 1,
                b'"' => in_quotes = false,
                b'\n' => line += 1,
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => line += 1,
                _ => {}
            }
        } else {
            match b {
                b'"' if at_field_start => {
                    in_quotes = true;
                    opened_at = line;
                    at_field_start = false;
                }
                b',' => at_field_start = true,
                b'\n' => {
                    line += 1;
                    at_field_start = true;
                }
                b'\r' => {
                    if bytes.get(i + 1) != Some(&b'\n') {
                        line += 1;
                    }
                    at_field_start = true;
                }
                _ => at_field_start = false,
            }
        }
        i += 1;
    }

    if in_quotes {
        return Err(ParseError::new(opened_at, "unterminated quoted field"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 10 * 1024 * 1024;

    #[test]
    fn header_defines_columns_and_rows_are_numbered_from_two() {
        let rows = parse_rows(b"site_name,latitude,longitude\nA,91,10\nB,45,45").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 2);
        assert_eq!(rows[0].get("site_name"), Some("A"));
        assert_eq!(rows[0].get("latitude"), Some("91"));
        assert_eq!(rows[1].index, 3);
        assert_eq!(rows[1].get("longitude"), Some("45"));
    }

    #[test]
    fn empty_lines_are_skipped() {
        let rows = parse_rows(b"\n\nsite_name,latitude\n\nA,1\n\r\n   \nB,2\n\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("site_name"), Some("A"));
        assert_eq!(rows[1].get("site_name"), Some("B"));
        assert_eq!(rows[1].index, 3);
    }

    #[test]
    fn separator_only_lines_are_rows() {
        let rows = parse_rows(b"site_name,latitude,longitude\nA,1,1\n,,\n\" \" , ,\n").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].index, 3);
        assert_eq!(rows[1].get("site_name"), Some(""));
        assert_eq!(rows[2].index, 4);
        assert_eq!(rows[2].trimmed("site_name"), None);
        assert!(rows[2].has_column("longitude"));
    }

    #[test]
    fn lone_carriage_returns_end_lines() {
        let rows = parse_rows(b"site_name,latitude\rA,1\rB,2\r").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("site_name"), Some("B"));
        assert_eq!(rows[1].get("latitude"), Some("2"));
    }

    #[test]
    fn unterminated_quote_after_lone_carriage_return_is_a_parse_error() {
        let err = parse_rows(b"site_name,latitude,longitude\rA,1,1\r\"B,2,2\rC,3,3\r").unwrap_err();
        assert_eq!(err.line, 3);

        let err = parse_rows(b"site_name,latitude,longitude\rA,1,1\rB,2,\"3\r").unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let rows = parse_rows(b"a,b,c\n1\n1,2,3,4").unwrap();
        assert_eq!(rows[0].get("b"), Some(""));
        assert_eq!(rows[0].get("c"), Some(""));
        assert_eq!(rows[1].values.len(), 3);
        assert_eq!(rows[1].get("c"), Some("3"));
    }

    #[test]
    fn headers_are_trimmed_and_bom_stripped() {
        let rows = parse_rows("\u{feff} site_name , latitude\nA,1".as_bytes()).unwrap();
        assert!(rows[0].has_column("site_name"));
        assert!(rows[0].has_column("latitude"));
    }

    #[test]
    fn quoted_fields_keep_commas_and_newlines() {
        let rows = parse_rows(b"site_name,authority\n\"A, North\",\"line one\nline two\"\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("site_name"), Some("A, North"));
        assert_eq!(rows[0].get("authority"), Some("line one\nline two"));
    }

    #[test]
    fn escaped_quotes_are_not_unterminated() {
        let rows = parse_rows(b"site_name\n\"The \"\"Old\"\" Yard\"\n").unwrap();
        assert_eq!(rows[0].get("site_name"), Some("The \"Old\" Yard"));
    }

    #[test]
    fn unterminated_quote_is_a_parse_error() {
        let err = parse_rows(b"site_name,latitude\nA,1\n\"B,2\nC,3\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let err = parse_rows(b"site_name\n\xff\xfe\n").unwrap_err();
        assert!(err.message.contains("UTF-8"));
    }

    #[test]
    fn header_only_and_empty_inputs_have_no_rows() {
        assert!(parse_rows(b"").unwrap().is_empty());
        assert!(parse_rows(b"site_name,latitude,longitude\n").unwrap().is_empty());
    }

    #[test]
    fn upload_check_enforces_size_before_type() {
        let err = check_upload(Some("sites.csv"), Some("text/csv"), LIMIT + 1, LIMIT).unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { size, limit } if size == LIMIT + 1 && limit == LIMIT));
        assert!(check_upload(Some("sites.csv"), Some("text/csv"), LIMIT, LIMIT).is_ok());
    }

    #[test]
    fn upload_check_accepts_csv_name_or_type() {
        assert!(check_upload(Some("sites.CSV"), None, 10, LIMIT).is_ok());
        assert!(check_upload(Some("sites.csv"), Some("application/octet-stream"), 10, LIMIT).is_ok());
        assert!(check_upload(Some("export"), Some("text/csv; charset=utf-8"), 10, LIMIT).is_ok());
        assert!(check_upload(Some("sites.csv"), Some("application/vnd.ms-excel"), 10, LIMIT).is_ok());
        assert!(matches!(
            check_upload(Some("sites.xlsx"), Some("application/pdf"), 10, LIMIT),
            Err(UploadError::UnsupportedContentType(_))
        ));
        assert!(matches!(
            check_upload(Some("notes"), None, 10, LIMIT),
            Err(UploadError::UnsupportedContentType(_))
        ));
    }
}
