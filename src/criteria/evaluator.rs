use rand::Rng;
use tracing::debug;

use crate::candidate::{CandidateRecord, FieldValue};
use crate::criteria::schema::{Connective, CriteriaGroup, Rule, RuleValue};
use crate::fields::Operator;
use crate::geo::distance_km;

/// Recursively evaluates a criteria tree against one candidate.
///
/// Disabled rules are skipped. With no effective children left, AND yields
/// `true` (empty conjunction) while OR yields `false` (empty disjunction is
/// unsatisfiable) — the one place the connectives are not symmetric.
pub fn evaluate(group: &CriteriaGroup, candidate: &CandidateRecord) -> bool {
    let mut verdicts = group
        .rules
        .iter()
        .filter(|rule| !rule.is_disabled())
        .map(|rule| rule_matches(rule, candidate))
        .chain(group.groups.iter().map(|child| evaluate(child, candidate)));

    match group.connective {
        Connective::And => verdicts.all(|v| v),
        Connective::Or => verdicts.any(|v| v),
    }
}

/// One predicate against one candidate. Never panics: a missing field or a
/// value of the wrong shape makes the rule `false`, so a partial record
/// degrades to "does not match" instead of aborting a batch filter.
pub fn rule_matches(rule: &Rule, candidate: &CandidateRecord) -> bool {
    let (Some(operator), Some(value)) = (rule.operator, &rule.value) else {
        return true;
    };
    if value.is_empty() {
        return true;
    }
    let Some(candidate_value) = candidate.field_value(&rule.field_id) else {
        return false;
    };

    match (candidate_value, operator, value) {
        (FieldValue::Text(have), Operator::Equals, RuleValue::Text(want)) => have == want,
        (FieldValue::Text(have), Operator::NotEquals, RuleValue::Text(want)) => have != want,
        (FieldValue::Text(have), Operator::In, RuleValue::TextList(want)) => want.contains(have),
        (FieldValue::Text(have), Operator::NotIn, RuleValue::TextList(want)) => {
            !want.contains(have)
        }

        (FieldValue::TextSet(have), Operator::Contains, RuleValue::Text(want)) => {
            have.contains(want)
        }
        (FieldValue::TextSet(have), Operator::NotContains, RuleValue::Text(want)) => {
            !have.contains(want)
        }
        (FieldValue::TextSet(have), Operator::ContainsAll, RuleValue::TextList(want)) => {
            want.iter().all(|item| have.contains(item))
        }
        (FieldValue::TextSet(have), Operator::ContainsAny, RuleValue::TextList(want)) => {
            want.iter().any(|item| have.contains(item))
        }

        (FieldValue::Number(have), Operator::Equals, RuleValue::Number(want)) => have == want,
        (FieldValue::Number(have), Operator::GreaterThan, RuleValue::Number(want)) => have > want,
        (FieldValue::Number(have), Operator::LessThan, RuleValue::Number(want)) => have < want,
        (FieldValue::Number(have), Operator::Between, RuleValue::NumberRange { min, max }) => {
            (*min..=*max).contains(have)
        }

        (FieldValue::Bool(have), Operator::Is, RuleValue::Bool(want)) => have == want,
        (FieldValue::Bool(have), Operator::IsNot, RuleValue::Bool(want)) => have != want,

        (FieldValue::Date(have), Operator::Before, RuleValue::Date(want)) => have < want,
        (FieldValue::Date(have), Operator::After, RuleValue::Date(want)) => have > want,
        (FieldValue::Date(have), Operator::Between, RuleValue::DateRange { start, end }) => {
            (*start..=*end).contains(have)
        }

        (
            FieldValue::Location(have),
            Operator::WithinRadius,
            RuleValue::Geo { center, radius_km },
        ) => distance_km(have.point, *center) <= *radius_km,
        (
            FieldValue::Location(have),
            Operator::OutsideRadius,
            RuleValue::Geo { center, radius_km },
        ) => distance_km(have.point, *center) > *radius_km,
        (FieldValue::Location(have), Operator::InState, RuleValue::Text(want)) => {
            have.state.as_deref() == Some(want.as_str())
        }
        (FieldValue::Location(have), Operator::InRegion, RuleValue::Text(want)) => {
            have.region.as_deref() == Some(want.as_str())
        }
        (FieldValue::Location(have), Operator::InRegion, RuleValue::TextList(want)) => have
            .region
            .as_deref()
            .map(|region| want.iter().any(|item| item == region))
            .unwrap_or(false),

        // Shape mismatch between the record and the rule fails closed.
        _ => false,
    }
}

/// Exact match count over a population.
pub fn estimate_count(group: &CriteriaGroup, population: &[CandidateRecord]) -> usize {
    population
        .iter()
        .filter(|candidate| evaluate(group, candidate))
        .count()
}

/// Match-count estimate from a uniform sample without replacement, scaled to
/// the population size. With `sample_size >= population.len()` this is the
/// exact count, so the estimate converges as the sample grows.
pub fn estimate_count_sampled<R: Rng + ?Sized>(
    group: &CriteriaGroup,
    population: &[CandidateRecord],
    sample_size: usize,
    rng: &mut R,
) -> usize {
    if sample_size == 0 || population.is_empty() {
        return 0;
    }
    if sample_size >= population.len() {
        return estimate_count(group, population);
    }

    debug!(
        population = population.len(),
        sample_size, "estimating match count from sample"
    );
    let indices = rand::seq::index::sample(rng, population.len(), sample_size);
    let hits = indices
        .iter()
        .filter(|&i| evaluate(group, &population[i]))
        .count();
    ((hits * population.len()) as f64 / sample_size as f64).round() as usize
}
