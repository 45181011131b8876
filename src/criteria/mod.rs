pub mod evaluator;
pub mod schema;
pub mod validate;

pub use evaluator::{estimate_count, estimate_count_sampled, evaluate, rule_matches};
pub use schema::{Connective, CriteriaGroup, Rule, RuleValue, DEFAULT_RULE_WEIGHT, MAX_RULE_WEIGHT};
pub use validate::{validate_group, validate_rule, ValidationError};
