use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One data line of an uploaded file, keyed by header name.
///
/// `index` is 1-based with the header occupying row 1, so the first data
/// line is row 2. Values are kept exactly as read; trimming and coercion
/// happen during validation and normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub index: usize,
    pub values: BTreeMap<String, String>,
}

impl RawRow {
    pub fn new(index: usize, values: BTreeMap<String, String>) -> Self {
        Self { index, values }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// The trimmed value of a column, or `None` when it is absent or blank.
    pub fn trimmed(&self, column: &str) -> Option<&str> {
        self.get(column).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskStatus {
    High,
    Low,
}

impl RiskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskStatus::High => "High",
            RiskStatus::Low => "Low",
        }
    }
}

impl FromStr for RiskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(RiskStatus::High),
            "Low" => Ok(RiskStatus::Low),
            other => Err(format!("unknown risk status: {other}")),
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, trimmed and type-coerced site ready for persistence.
///
/// Optional columns whose raw value was blank are stored as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub site_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub risk_status: Option<RiskStatus>,
    pub site_type: Option<String>,
    pub authority: Option<String>,
    pub summer_capacity: Option<f64>,
    pub winter_capacity: Option<f64>,
    pub functional_location: Option<String>,
    pub licence_area: Option<String>,
    pub power_transformers: Option<String>,
    pub site_voltage: Option<String>,
    pub what3words: Option<String>,
    pub r#type: Option<String>,
    pub voltage_transformer_ratings: Option<String>,
    pub connection_queue: Option<String>,
    /// Identity of the user who uploaded the file.
    pub uploaded_by: String,
}
