use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// WGS84 coordinates, degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub point: GeoPoint,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// One resolvable value inside a candidate or opportunity record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    TextSet(Vec<String>),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    Location(Location),
}

/// An opaque key-value bag keyed by field id. The engine assumes no fixed
/// candidate schema beyond "fields referenced by rules and metrics must be
/// resolvable here".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateRecord {
    pub id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl CandidateRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, field_id: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(field_id.into(), value);
        self
    }

    pub fn field_value(&self, field_id: &str) -> Option<&FieldValue> {
        self.fields.get(field_id)
    }

    /// An emergency-medicine physician with the fields the default registry
    /// and derive functions reference. Used by tests and doc examples.
    pub fn sample(id: impl Into<String>) -> Self {
        Self::new(id)
            .with_field("specialty", FieldValue::Text("Emergency Medicine".to_string()))
            .with_field("experience", FieldValue::Number(8.0))
            .with_field(
                "licenses",
                FieldValue::TextSet(vec!["TX".to_string(), "OK".to_string()]),
            )
            .with_field("board_certified", FieldValue::Bool(true))
            .with_field(
                "available_from",
                FieldValue::Date(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap_or_default()),
            )
            .with_field("desired_rate", FieldValue::Number(240.0))
            .with_field(
                "location",
                FieldValue::Location(Location {
                    point: GeoPoint {
                        lat: 32.7767,
                        lng: -96.7970,
                    },
                    state: Some("TX".to_string()),
                    region: Some("South".to_string()),
                }),
            )
    }
}

/// The target an opportunity-side scoring pass compares candidates against.
/// Same shape as [`CandidateRecord`]; kept a distinct type so the two sides
/// of a (candidate, opportunity) pair cannot be swapped silently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Opportunity {
    pub id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Opportunity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, field_id: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(field_id.into(), value);
        self
    }

    pub fn field_value(&self, field_id: &str) -> Option<&FieldValue> {
        self.fields.get(field_id)
    }

    /// An ED staffing opportunity in Fort Worth matching the fields of
    /// [`CandidateRecord::sample`].
    pub fn sample(id: impl Into<String>) -> Self {
        Self::new(id)
            .with_field("specialty", FieldValue::Text("Emergency Medicine".to_string()))
            .with_field("min_experience", FieldValue::Number(5.0))
            .with_field("max_experience", FieldValue::Number(15.0))
            .with_field(
                "required_licenses",
                FieldValue::TextSet(vec!["TX".to_string()]),
            )
            .with_field(
                "start_date",
                FieldValue::Date(NaiveDate::from_ymd_opt(2026, 11, 1).unwrap_or_default()),
            )
            .with_field("offer_rate", FieldValue::Number(255.0))
            .with_field(
                "location",
                FieldValue::Location(Location {
                    point: GeoPoint {
                        lat: 32.7555,
                        lng: -97.3308,
                    },
                    state: Some("TX".to_string()),
                    region: Some("South".to_string()),
                }),
            )
    }
}
