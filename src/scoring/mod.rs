pub mod derive;
pub mod engine;

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use derive::{DeriveFn, DeriveRegistry};
pub use engine::score;

/// Serializable description of one scoring metric. The derivation function
/// is the one non-serializable part; over a wire boundary it is resolved by
/// id against a [`DeriveRegistry`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricSpec {
    pub id: String,
    pub category: String,
    pub label: String,
    pub weight: u32,
    pub max_value: f64,
    /// Registry key for the derivation; defaults to the metric id.
    #[serde(default)]
    pub derive_id: Option<String>,
}

impl MetricSpec {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        label: impl Into<String>,
        weight: u32,
        max_value: f64,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            label: label.into(),
            weight,
            max_value,
            derive_id: None,
        }
    }

    pub fn with_derive_id(mut self, derive_id: impl Into<String>) -> Self {
        self.derive_id = Some(derive_id.into());
        self
    }

    pub fn derive_key(&self) -> &str {
        self.derive_id.as_deref().unwrap_or(&self.id)
    }
}

/// A metric spec bound to its derivation function.
#[derive(Clone)]
pub struct Metric {
    pub spec: MetricSpec,
    pub derive: DeriveFn,
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metric")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate metric id: {0}")]
    DuplicateMetric(String),
    #[error("metric {0} has zero weight")]
    ZeroWeight(String),
    #[error("metric {id} has unusable max value: {max_value}")]
    InvalidMaxValue { id: String, max_value: f64 },
    #[error("catalog total weight is zero")]
    ZeroTotalWeight,
    #[error("no derivation registered for metric {0}")]
    UnknownDerivation(String),
}

/// Ordered metric catalog, validated at load time: unique ids, positive
/// weights and max values, non-zero total weight. Structural errors are
/// caught here, before any scoring runs.
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    metrics: Vec<Metric>,
    total_weight: u32,
}

impl MetricCatalog {
    pub fn new(metrics: Vec<Metric>) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();
        let mut total_weight = 0u32;
        for metric in &metrics {
            let spec = &metric.spec;
            if !seen.insert(spec.id.clone()) {
                return Err(CatalogError::DuplicateMetric(spec.id.clone()));
            }
            if spec.weight == 0 {
                return Err(CatalogError::ZeroWeight(spec.id.clone()));
            }
            if !spec.max_value.is_finite() || spec.max_value <= 0.0 {
                return Err(CatalogError::InvalidMaxValue {
                    id: spec.id.clone(),
                    max_value: spec.max_value,
                });
            }
            total_weight += spec.weight;
        }
        if total_weight == 0 {
            return Err(CatalogError::ZeroTotalWeight);
        }
        Ok(Self {
            metrics,
            total_weight,
        })
    }

    /// Wire-side construction: binds serialized specs to derivations from
    /// the registry.
    pub fn resolve(specs: Vec<MetricSpec>, registry: &DeriveRegistry) -> Result<Self, CatalogError> {
        let mut metrics = Vec::with_capacity(specs.len());
        for spec in specs {
            let derive = registry
                .get(spec.derive_key())
                .ok_or_else(|| CatalogError::UnknownDerivation(spec.id.clone()))?;
            metrics.push(Metric { spec, derive });
        }
        Self::new(metrics)
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn total_weight(&self) -> u32 {
        self.total_weight
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
}

impl Grade {
    /// Inclusive lower bounds: 90 A+, 85 A, 80 B+, 75 B, 70 C+, 65 C.
    pub fn for_overall(overall: u8) -> Self {
        match overall {
            90.. => Self::APlus,
            85.. => Self::A,
            80.. => Self::BPlus,
            75.. => Self::B,
            70.. => Self::CPlus,
            65.. => Self::C,
            _ => Self::D,
        }
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let display = match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::D => "D",
        };
        write!(f, "{display}")
    }
}

/// Explainability bucket on a normalized percentage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl StatusBucket {
    pub fn for_percent(percent: f64) -> Self {
        if percent >= 90.0 {
            Self::Excellent
        } else if percent >= 75.0 {
            Self::Good
        } else if percent >= 60.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricBreakdown {
    pub metric_id: String,
    pub label: String,
    pub weight: u32,
    pub raw: f64,
    pub max_value: f64,
    pub percent: f64,
    pub contribution: f64,
    pub status: StatusBucket,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryScore {
    pub score: f64,
    pub max_score: f64,
    pub percent: f64,
    pub status: StatusBucket,
    pub metrics: Vec<MetricBreakdown>,
}

/// Immutable output of scoring one candidate against one opportunity,
/// computed fresh per call. The per-category and per-metric breakdown is
/// part of the contract: ranking UIs and "why this match" views consume it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreResult {
    pub candidate_id: String,
    pub opportunity_id: String,
    pub overall: u8,
    pub grade: Grade,
    pub categories: std::collections::BTreeMap<String, CategoryScore>,
}

impl ScoreResult {
    /// Metrics that carried the score (excellent bucket).
    pub fn strengths(&self) -> Vec<&MetricBreakdown> {
        self.metric_breakdowns()
            .filter(|m| m.status == StatusBucket::Excellent)
            .collect()
    }

    /// Metrics that dragged the score down (poor bucket).
    pub fn weaknesses(&self) -> Vec<&MetricBreakdown> {
        self.metric_breakdowns()
            .filter(|m| m.status == StatusBucket::Poor)
            .collect()
    }

    fn metric_breakdowns(&self) -> impl Iterator<Item = &MetricBreakdown> {
        self.categories.values().flat_map(|c| c.metrics.iter())
    }
}
