//! Plain-text rendering of validation reports and the CSV upload template.

use common::model::schema::SITE_FIELDS;
use common::model::validation::{Finding, ValidationReport};
use std::fmt::Write;

pub const MAX_LISTED_ERRORS: usize = 10;
pub const MAX_LISTED_WARNINGS: usize = 5;

/// Renders counts followed by the first errors and warnings.
///
/// Counts always reflect the full report; only the lists are truncated.
pub fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    let verdict = if report.is_valid {
        "Validation passed"
    } else {
        "Validation failed"
    };
    let _ = writeln!(
        out,
        "{verdict}: {} rows, {} valid, {} errors, {} warnings",
        report.row_count,
        report.valid_rows,
        report.error_count(),
        report.warning_count()
    );
    render_findings(&mut out, "Errors", &report.errors, MAX_LISTED_ERRORS);
    render_findings(&mut out, "Warnings", &report.warnings, MAX_LISTED_WARNINGS);
    out
}

fn render_findings(out: &mut String, title: &str, findings: &[Finding], limit: usize) {
    if findings.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title}:");
    for finding in findings.iter().take(limit) {
        let _ = writeln!(out, "- {finding}");
    }
    if findings.len() > limit {
        let _ = writeln!(out, "...and {} more", findings.len() - limit);
    }
}

/// The downloadable template: every schema field as header, required fields
/// first, followed by one example row.
pub fn render_template() -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SITE_FIELDS.iter().map(|f| f.name))?;
    writer.write_record(SITE_FIELDS.iter().map(|f| f.example))?;
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parser::parse_rows;
    use crate::pipeline::validator::validate;

    fn report_with(errors: usize, warnings: usize) -> ValidationReport {
        ValidationReport {
            is_valid: errors == 0,
            row_count: errors + warnings,
            valid_rows: warnings,
            errors: (0..errors)
                .map(|i| Finding::error(i + 2, "latitude", format!("Invalid latitude ({i})")))
                .collect(),
            warnings: (0..warnings)
                .map(|i| Finding::warning(i + 2, "risk_status", "Invalid risk_status (x)"))
                .collect(),
        }
    }

    #[test]
    fn short_lists_are_rendered_in_full() {
        let text = render_report(&report_with(2, 1));
        assert!(text.starts_with("Validation failed: 3 rows, 1 valid, 2 errors, 1 warnings"));
        assert!(text.contains("- Row 2, latitude: Invalid latitude (0)"));
        assert!(text.contains("- Row 3, latitude: Invalid latitude (1)"));
        assert!(!text.contains("more"));
    }

    #[test]
    fn long_lists_are_truncated_but_counts_are_not() {
        let text = render_report(&report_with(25, 8));
        assert!(text.contains("25 errors, 8 warnings"));
        assert_eq!(text.matches("- Row").count(), MAX_LISTED_ERRORS + MAX_LISTED_WARNINGS);
        assert!(text.contains("...and 15 more"));
        assert!(text.contains("...and 3 more"));
        assert!(!text.contains("Invalid latitude (10)"));
    }

    #[test]
    fn passing_report_has_no_lists() {
        let text = render_report(&report_with(0, 0));
        assert_eq!(text, "Validation passed: 0 rows, 0 valid, 0 errors, 0 warnings\n");
    }

    #[test]
    fn template_lists_all_fields_and_one_example() {
        let bytes = render_template().unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("site_name,latitude,longitude,risk_status,"));
        assert_eq!(header.split(',').count(), 16);
        assert_eq!(lines.count(), 1);

        let rows = parse_rows(&bytes).unwrap();
        let report = validate(&rows);
        assert!(report.is_valid);
        assert!(report.warnings.is_empty());
        assert_eq!(report.valid_rows, 1);
    }
}
