pub mod registry;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use registry::{FieldRegistry, UnknownFieldError};

/// Closed set of matchable value types. Each variant carries its own fixed
/// legal-operator set, so an invalid (field, operator) pairing is caught at
/// construction rather than by ad hoc checks downstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Select,
    MultiSelect,
    Range,
    Boolean,
    Date,
    GeoRadius,
}

impl ValueType {
    /// The fixed operator-compatibility table. Every field's allowed
    /// operators must be a non-empty subset of this.
    pub fn legal_operators(self) -> &'static [Operator] {
        match self {
            Self::Select => &[
                Operator::Equals,
                Operator::NotEquals,
                Operator::In,
                Operator::NotIn,
            ],
            Self::MultiSelect => &[
                Operator::Contains,
                Operator::NotContains,
                Operator::ContainsAll,
                Operator::ContainsAny,
            ],
            Self::Range => &[
                Operator::Equals,
                Operator::GreaterThan,
                Operator::LessThan,
                Operator::Between,
            ],
            Self::Boolean => &[Operator::Is, Operator::IsNot],
            Self::Date => &[Operator::Before, Operator::After, Operator::Between],
            Self::GeoRadius => &[
                Operator::WithinRadius,
                Operator::OutsideRadius,
                Operator::InState,
                Operator::InRegion,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Contains,
    NotContains,
    ContainsAll,
    ContainsAny,
    GreaterThan,
    LessThan,
    Between,
    Is,
    IsNot,
    Before,
    After,
    WithinRadius,
    OutsideRadius,
    InState,
    InRegion,
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::ContainsAll => "contains_all",
            Self::ContainsAny => "contains_any",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::Between => "between",
            Self::Is => "is",
            Self::IsNot => "is_not",
            Self::Before => "before",
            Self::After => "after",
            Self::WithinRadius => "within_radius",
            Self::OutsideRadius => "outside_radius",
            Self::InState => "in_state",
            Self::InRegion => "in_region",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown operator: {0}")]
pub struct OperatorParseError(pub String);

impl FromStr for Operator {
    type Err = OperatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        let operator = match normalized.as_str() {
            "equals" | "eq" => Operator::Equals,
            "not_equals" | "neq" => Operator::NotEquals,
            "in" => Operator::In,
            "not_in" => Operator::NotIn,
            "contains" => Operator::Contains,
            "not_contains" => Operator::NotContains,
            "contains_all" => Operator::ContainsAll,
            "contains_any" => Operator::ContainsAny,
            "greater_than" | "gt" => Operator::GreaterThan,
            "less_than" | "lt" => Operator::LessThan,
            "between" => Operator::Between,
            "is" => Operator::Is,
            "is_not" => Operator::IsNot,
            "before" => Operator::Before,
            "after" => Operator::After,
            "within_radius" => Operator::WithinRadius,
            "outside_radius" => Operator::OutsideRadius,
            "in_state" => Operator::InState,
            "in_region" => Operator::InRegion,
            _ => return Err(OperatorParseError(s.to_string())),
        };
        Ok(operator)
    }
}

/// Numeric bounds advertised by a Range field, informational for form
/// rendering. Rule validation does not clamp to them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    pub id: String,
    pub label: String,
    pub value_type: ValueType,
    pub allowed_operators: Vec<Operator>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

#[derive(Debug, Error)]
pub enum FieldDefError {
    #[error("field {0} declares no allowed operators")]
    EmptyOperators(String),
    #[error("operator {operator} is not legal for {value_type:?} field {field_id}")]
    OperatorNotLegal {
        field_id: String,
        operator: Operator,
        value_type: ValueType,
    },
}

impl FieldDef {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        value_type: ValueType,
        allowed_operators: Vec<Operator>,
    ) -> Result<Self, FieldDefError> {
        let id = id.into();
        if allowed_operators.is_empty() {
            return Err(FieldDefError::EmptyOperators(id));
        }
        let legal = value_type.legal_operators();
        for operator in &allowed_operators {
            if !legal.contains(operator) {
                return Err(FieldDefError::OperatorNotLegal {
                    field_id: id,
                    operator: *operator,
                    value_type,
                });
            }
        }
        Ok(Self {
            id,
            label: label.into(),
            value_type,
            allowed_operators,
            options: Vec::new(),
            bounds: None,
        })
    }

    /// A field allowing every operator legal for its value type. Cannot fail.
    pub fn with_all_operators(
        id: impl Into<String>,
        label: impl Into<String>,
        value_type: ValueType,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value_type,
            allowed_operators: value_type.legal_operators().to_vec(),
            options: Vec::new(),
            bounds: None,
        }
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.bounds = Some(Bounds { min, max });
        self
    }

    pub fn allows(&self, operator: Operator) -> bool {
        self.allowed_operators.contains(&operator)
    }
}
