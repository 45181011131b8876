use std::collections::BTreeMap;

use thiserror::Error;
use tracing::warn;

use crate::fields::{FieldDef, ValueType};

#[derive(Debug, Error)]
#[error("unknown field: {0}")]
pub struct UnknownFieldError(pub String);

/// Static catalog of matchable fields. Populated once at process start and
/// read-only for the lifetime of the process; adding fields means building a
/// new registry.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: BTreeMap<String, FieldDef>,
}

impl FieldRegistry {
    pub fn from_fields(fields: Vec<FieldDef>) -> Self {
        let mut map = BTreeMap::new();
        for field in fields {
            if map.contains_key(&field.id) {
                warn!("duplicate field id in registry, keeping first: {}", field.id);
                continue;
            }
            map.insert(field.id.clone(), field);
        }
        Self { fields: map }
    }

    pub fn get(&self, field_id: &str) -> Result<&FieldDef, UnknownFieldError> {
        self.fields
            .get(field_id)
            .ok_or_else(|| UnknownFieldError(field_id.to_string()))
    }

    pub fn contains(&self, field_id: &str) -> bool {
        self.fields.contains_key(field_id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }

    /// The default field catalog for clinician matching.
    pub fn healthcare_defaults() -> Self {
        Self::from_fields(vec![
            FieldDef::with_all_operators("specialty", "Specialty", ValueType::Select).with_options(
                vec![
                    "Emergency Medicine".to_string(),
                    "Cardiology".to_string(),
                    "Hospitalist".to_string(),
                    "Anesthesiology".to_string(),
                    "Family Medicine".to_string(),
                ],
            ),
            FieldDef::with_all_operators("experience", "Years of Experience", ValueType::Range)
                .with_bounds(0.0, 40.0),
            FieldDef::with_all_operators("licenses", "State Licenses", ValueType::MultiSelect),
            FieldDef::with_all_operators(
                "certifications",
                "Certifications",
                ValueType::MultiSelect,
            ),
            FieldDef::with_all_operators("board_certified", "Board Certified", ValueType::Boolean),
            FieldDef::with_all_operators("available_from", "Available From", ValueType::Date),
            FieldDef::with_all_operators("desired_rate", "Desired Hourly Rate", ValueType::Range)
                .with_bounds(0.0, 1000.0),
            FieldDef::with_all_operators("location", "Location", ValueType::GeoRadius),
        ])
    }
}
