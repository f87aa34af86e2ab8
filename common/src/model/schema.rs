//! Static definition of the site upload schema.
//!
//! The registry is the single source of truth for which columns an uploaded
//! file must carry, which ones are recognised, and which value constraints
//! apply to them. The validator checks rows against it and the template
//! renderer lists its fields, in registry order, as the header of the
//! downloadable example file.

use serde::Serialize;

/// File name offered for the downloadable CSV template.
pub const TEMPLATE_FILENAME: &str = "site_upload_template.csv";

/// Accepted values of the `risk_status` column.
pub const RISK_STATUS_VALUES: &[&str] = &["High", "Low"];

/// The kind of value a column holds, and therefore how it is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    /// Decimal degrees in `[-90, 90]`.
    Latitude,
    /// Decimal degrees in `[-180, 180]`.
    Longitude,
    /// One value out of a closed set.
    Enumerated(&'static [&'static str]),
    Numeric,
}

/// One column of the site schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub name: &'static str,
    pub required: bool,
    pub kind: FieldKind,
    /// Illustrative value used for the template's example row.
    pub example: &'static str,
}

impl FieldDefinition {
    const fn required(name: &'static str, kind: FieldKind, example: &'static str) -> Self {
        Self {
            name,
            required: true,
            kind,
            example,
        }
    }

    const fn optional(name: &'static str, kind: FieldKind, example: &'static str) -> Self {
        Self {
            name,
            required: false,
            kind,
            example,
        }
    }

    /// The closed set of accepted values, for enumerated fields.
    pub fn allowed_values(&self) -> Option<&'static [&'static str]> {
        match self.kind {
            FieldKind::Enumerated(values) => Some(values),
            _ => None,
        }
    }
}

/// Every recognised column, required fields first, in template order.
pub const SITE_FIELDS: &[FieldDefinition] = &[
    FieldDefinition::required("site_name", FieldKind::Text, "Example Primary Substation"),
    FieldDefinition::required("latitude", FieldKind::Latitude, "51.5074"),
    FieldDefinition::required("longitude", FieldKind::Longitude, "-0.1278"),
    FieldDefinition::optional(
        "risk_status",
        FieldKind::Enumerated(RISK_STATUS_VALUES),
        "High",
    ),
    FieldDefinition::optional("site_type", FieldKind::Text, "Primary"),
    FieldDefinition::optional("authority", FieldKind::Text, "Example District Council"),
    FieldDefinition::optional("summer_capacity", FieldKind::Numeric, "24.5"),
    FieldDefinition::optional("winter_capacity", FieldKind::Numeric, "30"),
    FieldDefinition::optional("functional_location", FieldKind::Text, "FL-000123"),
    FieldDefinition::optional("licence_area", FieldKind::Text, "London"),
    FieldDefinition::optional("power_transformers", FieldKind::Text, "2"),
    FieldDefinition::optional("site_voltage", FieldKind::Text, "33kV"),
    FieldDefinition::optional("what3words", FieldKind::Text, "///index.home.raft"),
    FieldDefinition::optional("type", FieldKind::Text, "Grid"),
    FieldDefinition::optional("voltage_transformer_ratings", FieldKind::Text, "33/11kV 15MVA"),
    FieldDefinition::optional("connection_queue", FieldKind::Text, "Q-2024-017"),
];

/// Required fields in registry order.
pub fn required_fields() -> impl Iterator<Item = &'static FieldDefinition> {
    SITE_FIELDS.iter().filter(|f| f.required)
}

/// Optional fields in registry order.
pub fn optional_fields() -> impl Iterator<Item = &'static FieldDefinition> {
    SITE_FIELDS.iter().filter(|f| !f.required)
}

pub fn required_field_names() -> Vec<&'static str> {
    required_fields().map(|f| f.name).collect()
}

pub fn optional_field_names() -> Vec<&'static str> {
    optional_fields().map(|f| f.name).collect()
}

/// Looks up a field by column name.
pub fn field(name: &str) -> Option<&'static FieldDefinition> {
    SITE_FIELDS.iter().find(|f| f.name == name)
}

/// The enumerated constraint of a column, if it has one.
pub fn allowed_values(name: &str) -> Option<&'static [&'static str]> {
    field(name).and_then(FieldDefinition::allowed_values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lists_required_then_optional() {
        assert_eq!(SITE_FIELDS.len(), 16);
        assert_eq!(required_field_names(), vec!["site_name", "latitude", "longitude"]);
        assert_eq!(optional_field_names().first(), Some(&"risk_status"));
        assert_eq!(optional_field_names().last(), Some(&"connection_queue"));
        let first_optional = SITE_FIELDS.iter().position(|f| !f.required);
        assert_eq!(first_optional, Some(3));
    }

    #[test]
    fn only_risk_status_is_enumerated() {
        assert_eq!(allowed_values("risk_status"), Some(RISK_STATUS_VALUES));
        assert_eq!(allowed_values("site_type"), None);
        assert_eq!(allowed_values("no_such_column"), None);
    }

    #[test]
    fn field_names_are_unique() {
        let mut names: Vec<_> = SITE_FIELDS.iter().map(|f| f.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SITE_FIELDS.len());
    }
}
