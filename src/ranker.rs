use serde::{Deserialize, Serialize};

use crate::candidate::{CandidateRecord, Opportunity};
use crate::criteria::{evaluate, CriteriaGroup};
use crate::scoring::{score, MetricCatalog, ScoreResult};

/// Filter response: how many records satisfy the criteria, and which.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterOutcome {
    pub match_count: usize,
    pub matched_ids: Vec<String>,
}

pub fn filter(group: &CriteriaGroup, population: &[CandidateRecord]) -> FilterOutcome {
    let matched_ids: Vec<String> = population
        .iter()
        .filter(|candidate| evaluate(group, candidate))
        .map(|candidate| candidate.id.clone())
        .collect();
    FilterOutcome {
        match_count: matched_ids.len(),
        matched_ids,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedCandidate {
    pub candidate: CandidateRecord,
    pub score: ScoreResult,
}

/// Filters the population, scores the survivors against the opportunity,
/// sorts descending by overall score with candidate id as the tie-break, and
/// caps the result. Pure composition; identical inputs give identical output.
pub fn rank(
    group: &CriteriaGroup,
    population: &[CandidateRecord],
    opportunity: &Opportunity,
    catalog: &MetricCatalog,
    limit: usize,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = population
        .iter()
        .filter(|candidate| evaluate(group, candidate))
        .map(|candidate| RankedCandidate {
            candidate: candidate.clone(),
            score: score(candidate, opportunity, catalog),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .overall
            .cmp(&a.score.overall)
            .then_with(|| a.candidate.id.cmp(&b.candidate.id))
    });
    ranked.truncate(limit);
    ranked
}
