use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::candidate::GeoPoint;
use crate::fields::Operator;

pub const MAX_RULE_WEIGHT: u8 = 10;
pub const DEFAULT_RULE_WEIGHT: u8 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Connective {
    And,
    Or,
}

/// Comparison value attached to a rule. The shape must match the referenced
/// field's value type; `validate_rule` enforces this before a tree is used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuleValue {
    Text(String),
    TextList(Vec<String>),
    Number(f64),
    NumberRange { min: f64, max: f64 },
    Bool(bool),
    Date(NaiveDate),
    DateRange { start: NaiveDate, end: NaiveDate },
    Geo { center: GeoPoint, radius_km: f64 },
}

impl RuleValue {
    pub fn is_empty(&self) -> bool {
        match self {
            RuleValue::TextList(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// One predicate over one field. A rule with no operator or an unset/empty
/// value is disabled: it never excludes a candidate. This mirrors the
/// half-filled filter form, which is a state, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub id: String,
    pub field_id: String,
    #[serde(default)]
    pub operator: Option<Operator>,
    #[serde(default)]
    pub value: Option<RuleValue>,
    #[serde(default = "default_weight")]
    pub weight: u8,
}

fn default_weight() -> u8 {
    DEFAULT_RULE_WEIGHT
}

impl Rule {
    /// A disabled rule referencing `field_id`, awaiting operator and value.
    pub fn new(id: impl Into<String>, field_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_id: field_id.into(),
            operator: None,
            value: None,
            weight: DEFAULT_RULE_WEIGHT,
        }
    }

    pub fn with(
        id: impl Into<String>,
        field_id: impl Into<String>,
        operator: Operator,
        value: RuleValue,
    ) -> Self {
        Self {
            id: id.into(),
            field_id: field_id.into(),
            operator: Some(operator),
            value: Some(value),
            weight: DEFAULT_RULE_WEIGHT,
        }
    }

    pub fn with_weight(mut self, weight: u8) -> Self {
        self.weight = weight;
        self
    }

    pub fn is_disabled(&self) -> bool {
        match (&self.operator, &self.value) {
            (Some(_), Some(value)) => value.is_empty(),
            _ => true,
        }
    }
}

/// A boolean-connective node combining rules and nested groups. The tree is
/// immutable; the builder methods return restructured copies rather than
/// mutating in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CriteriaGroup {
    pub id: String,
    pub connective: Connective,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub groups: Vec<CriteriaGroup>,
}

impl CriteriaGroup {
    pub fn new(id: impl Into<String>, connective: Connective) -> Self {
        Self {
            id: id.into(),
            connective,
            rules: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_group(mut self, group: CriteriaGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.groups.is_empty()
    }

    /// SHA-256 over the canonical JSON form of the tree. Stable identity for
    /// external caching and deduplication of user-built criteria.
    pub fn content_hash(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_group() -> CriteriaGroup {
        CriteriaGroup::new("root", Connective::And)
            .with_rule(Rule::with(
                "r1",
                "specialty",
                Operator::Equals,
                RuleValue::Text("Cardiology".to_string()),
            ))
            .with_group(CriteriaGroup::new("inner", Connective::Or).with_rule(Rule::with(
                "r2",
                "experience",
                Operator::Between,
                RuleValue::NumberRange {
                    min: 5.0,
                    max: 15.0,
                },
            )))
    }

    #[test]
    fn tree_round_trips_through_json() {
        let group = nested_group();
        let json = serde_json::to_string(&group).expect("serialize");
        let back: CriteriaGroup = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(group, back);
    }

    #[test]
    fn content_hash_tracks_structure() {
        let group = nested_group();
        assert_eq!(group.content_hash(), nested_group().content_hash());

        let changed = nested_group().with_rule(Rule::new("r3", "licenses"));
        assert_ne!(group.content_hash(), changed.content_hash());
    }

    #[test]
    fn half_filled_rules_are_disabled() {
        assert!(Rule::new("r", "specialty").is_disabled());

        let mut rule = Rule::new("r", "specialty");
        rule.operator = Some(Operator::Equals);
        assert!(rule.is_disabled());

        assert!(Rule::with(
            "r",
            "licenses",
            Operator::ContainsAll,
            RuleValue::TextList(Vec::new())
        )
        .is_disabled());

        assert!(!Rule::with(
            "r",
            "specialty",
            Operator::Equals,
            RuleValue::Text("Cardiology".to_string())
        )
        .is_disabled());
    }
}
