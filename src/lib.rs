//! Candidate matching engine for healthcare recruitment.
//!
//! Two cooperating parts: a criteria query engine (nested AND/OR trees of
//! typed rules filtering a candidate population) and a weighted scoring
//! engine (multi-category metric aggregation producing a 0-100 score, a
//! letter grade, and an explainable breakdown). The ranker composes both
//! into an ordered, capped result set.
//!
//! Everything here is pure and synchronous: no I/O, no shared mutable
//! state. Candidate records are externally owned, read-only input.

pub mod candidate;
pub mod criteria;
pub mod fields;
pub mod geo;
pub mod ranker;
pub mod scoring;

pub use candidate::{CandidateRecord, FieldValue, GeoPoint, Location, Opportunity};
pub use criteria::{
    estimate_count, estimate_count_sampled, evaluate, rule_matches, validate_group, validate_rule,
    Connective, CriteriaGroup, Rule, RuleValue, ValidationError,
};
pub use fields::registry::{FieldRegistry, UnknownFieldError};
pub use fields::{FieldDef, Operator, ValueType};
pub use ranker::{filter, rank, FilterOutcome, RankedCandidate};
pub use scoring::{
    score, CatalogError, CategoryScore, DeriveRegistry, Grade, Metric, MetricBreakdown,
    MetricCatalog, MetricSpec, ScoreResult, StatusBucket,
};
