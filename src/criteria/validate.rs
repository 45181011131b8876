use thiserror::Error;

use crate::criteria::schema::{CriteriaGroup, Rule, RuleValue, MAX_RULE_WEIGHT};
use crate::fields::{FieldRegistry, Operator, UnknownFieldError, ValueType};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    UnknownField(#[from] UnknownFieldError),
    #[error("rule {rule_id}: operator {operator} is not allowed for field {field_id}")]
    OperatorNotAllowed {
        rule_id: String,
        field_id: String,
        operator: Operator,
    },
    #[error("rule {rule_id}: value shape does not match {expected:?} field {field_id}")]
    ValueShape {
        rule_id: String,
        field_id: String,
        expected: ValueType,
    },
    #[error("rule {rule_id}: range min {min} exceeds max {max}")]
    InvertedRange { rule_id: String, min: f64, max: f64 },
    #[error("rule {rule_id}: date range start {start} is after end {end}")]
    InvertedDateRange {
        rule_id: String,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    #[error("rule {rule_id}: radius {radius_km} km is not a usable radius")]
    InvalidRadius { rule_id: String, radius_km: f64 },
    #[error("rule {rule_id}: weight {weight} exceeds {MAX_RULE_WEIGHT}")]
    WeightOutOfRange { rule_id: String, weight: u8 },
}

/// Checks, in order: the field resolves, the operator is allowed for it, the
/// value shape matches the field's value type, and the weight is in range.
/// A disabled rule (no operator, or unset/empty value) validates clean; only
/// the parts that are present are checked.
pub fn validate_rule(rule: &Rule, registry: &FieldRegistry) -> Result<(), ValidationError> {
    let field = registry.get(&rule.field_id)?;

    if let Some(operator) = rule.operator {
        if !field.allows(operator) {
            return Err(ValidationError::OperatorNotAllowed {
                rule_id: rule.id.clone(),
                field_id: rule.field_id.clone(),
                operator,
            });
        }
        if let Some(value) = &rule.value {
            if !value.is_empty() {
                check_value_shape(rule, field.value_type, operator, value)?;
            }
        }
    }

    if rule.weight > MAX_RULE_WEIGHT {
        return Err(ValidationError::WeightOutOfRange {
            rule_id: rule.id.clone(),
            weight: rule.weight,
        });
    }
    Ok(())
}

/// Recursively validates every rule in the tree. First error wins.
pub fn validate_group(group: &CriteriaGroup, registry: &FieldRegistry) -> Result<(), ValidationError> {
    for rule in &group.rules {
        validate_rule(rule, registry)?;
    }
    for child in &group.groups {
        validate_group(child, registry)?;
    }
    Ok(())
}

fn check_value_shape(
    rule: &Rule,
    value_type: ValueType,
    operator: Operator,
    value: &RuleValue,
) -> Result<(), ValidationError> {
    let shape_error = || ValidationError::ValueShape {
        rule_id: rule.id.clone(),
        field_id: rule.field_id.clone(),
        expected: value_type,
    };

    match (value_type, operator, value) {
        (ValueType::Select, Operator::Equals | Operator::NotEquals, RuleValue::Text(_)) => Ok(()),
        (ValueType::Select, Operator::In | Operator::NotIn, RuleValue::TextList(_)) => Ok(()),
        (
            ValueType::MultiSelect,
            Operator::Contains | Operator::NotContains,
            RuleValue::Text(_),
        ) => Ok(()),
        (
            ValueType::MultiSelect,
            Operator::ContainsAll | Operator::ContainsAny,
            RuleValue::TextList(_),
        ) => Ok(()),
        (
            ValueType::Range,
            Operator::Equals | Operator::GreaterThan | Operator::LessThan,
            RuleValue::Number(_),
        ) => Ok(()),
        (ValueType::Range, Operator::Between, RuleValue::NumberRange { min, max }) => {
            if min > max {
                return Err(ValidationError::InvertedRange {
                    rule_id: rule.id.clone(),
                    min: *min,
                    max: *max,
                });
            }
            Ok(())
        }
        (ValueType::Boolean, Operator::Is | Operator::IsNot, RuleValue::Bool(_)) => Ok(()),
        (ValueType::Date, Operator::Before | Operator::After, RuleValue::Date(_)) => Ok(()),
        (ValueType::Date, Operator::Between, RuleValue::DateRange { start, end }) => {
            if start > end {
                return Err(ValidationError::InvertedDateRange {
                    rule_id: rule.id.clone(),
                    start: *start,
                    end: *end,
                });
            }
            Ok(())
        }
        (
            ValueType::GeoRadius,
            Operator::WithinRadius | Operator::OutsideRadius,
            RuleValue::Geo { radius_km, .. },
        ) => {
            if !radius_km.is_finite() || *radius_km < 0.0 {
                return Err(ValidationError::InvalidRadius {
                    rule_id: rule.id.clone(),
                    radius_km: *radius_km,
                });
            }
            Ok(())
        }
        (ValueType::GeoRadius, Operator::InState, RuleValue::Text(_)) => Ok(()),
        (ValueType::GeoRadius, Operator::InRegion, RuleValue::Text(_) | RuleValue::TextList(_)) => {
            Ok(())
        }
        _ => Err(shape_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::schema::Connective;

    fn registry() -> FieldRegistry {
        FieldRegistry::healthcare_defaults()
    }

    #[test]
    fn unknown_field_is_surfaced() {
        let rule = Rule::new("r1", "shoe_size");
        let err = validate_rule(&rule, &registry()).expect_err("unknown field");
        assert!(matches!(err, ValidationError::UnknownField(_)));
    }

    #[test]
    fn operator_must_be_allowed_for_field() {
        let rule = Rule::with(
            "r1",
            "experience",
            Operator::ContainsAll,
            RuleValue::TextList(vec!["x".to_string()]),
        );
        let err = validate_rule(&rule, &registry()).expect_err("illegal operator");
        assert!(matches!(err, ValidationError::OperatorNotAllowed { .. }));
    }

    #[test]
    fn value_shape_must_match_value_type() {
        let rule = Rule::with(
            "r1",
            "experience",
            Operator::GreaterThan,
            RuleValue::Text("five".to_string()),
        );
        let err = validate_rule(&rule, &registry()).expect_err("text against a range field");
        assert!(matches!(err, ValidationError::ValueShape { .. }));
    }

    #[test]
    fn between_requires_ordered_pair() {
        let rule = Rule::with(
            "r1",
            "experience",
            Operator::Between,
            RuleValue::NumberRange {
                min: 15.0,
                max: 5.0,
            },
        );
        let err = validate_rule(&rule, &registry()).expect_err("inverted range");
        assert!(matches!(err, ValidationError::InvertedRange { .. }));
    }

    #[test]
    fn weight_is_capped() {
        let rule = Rule::with(
            "r1",
            "specialty",
            Operator::Equals,
            RuleValue::Text("Cardiology".to_string()),
        )
        .with_weight(11);
        let err = validate_rule(&rule, &registry()).expect_err("weight over cap");
        assert!(matches!(err, ValidationError::WeightOutOfRange { .. }));
    }

    #[test]
    fn disabled_rule_validates_clean() {
        let rule = Rule::new("r1", "specialty");
        validate_rule(&rule, &registry()).expect("disabled rule is not an error");
    }

    #[test]
    fn group_validation_recurses() {
        let group = CriteriaGroup::new("root", Connective::And).with_group(
            CriteriaGroup::new("inner", Connective::Or).with_rule(Rule::new("r1", "shoe_size")),
        );
        let err = validate_group(&group, &registry()).expect_err("nested unknown field");
        assert!(matches!(err, ValidationError::UnknownField(_)));
    }
}
