use std::collections::BTreeMap;
use std::sync::Arc;

use crate::candidate::{CandidateRecord, FieldValue, Opportunity};
use crate::geo::distance_km;

/// Raw metric derivation over a (candidate, opportunity) pair. Plugin code:
/// the scoring engine clamps its output, so a derivation can never push a
/// metric outside `[0, max_value]`.
pub type DeriveFn = Arc<dyn Fn(&CandidateRecord, &Opportunity) -> f64 + Send + Sync>;

/// Named derivation functions, addressable by id so a serialized catalog can
/// be rebound on the receiving side of a wire boundary.
#[derive(Clone, Default)]
pub struct DeriveRegistry {
    derivations: BTreeMap<String, DeriveFn>,
}

impl DeriveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, derive: DeriveFn) {
        self.derivations.insert(id.into(), derive);
    }

    pub fn get(&self, id: &str) -> Option<DeriveFn> {
        self.derivations.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.derivations.contains_key(id)
    }

    /// Built-in clinician-matching derivations. All return values in
    /// `[0, 100]`; pair them with `max_value: 100`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("specialty_match", Arc::new(specialty_match));
        registry.register("distance_score", Arc::new(distance_score));
        registry.register("experience_fit", Arc::new(experience_fit));
        registry.register("availability_overlap", Arc::new(availability_overlap));
        registry.register("compensation_alignment", Arc::new(compensation_alignment));
        registry.register("credential_coverage", Arc::new(credential_coverage));
        registry
    }
}

/// 100 when the candidate practices the opportunity's specialty, 0 otherwise.
/// A multi-specialty candidate matches if any of their specialties does.
fn specialty_match(candidate: &CandidateRecord, opportunity: &Opportunity) -> f64 {
    let Some(FieldValue::Text(wanted)) = opportunity.field_value("specialty") else {
        return 0.0;
    };
    match candidate.field_value("specialty") {
        Some(FieldValue::Text(have)) if have == wanted => 100.0,
        Some(FieldValue::TextSet(have)) if have.contains(wanted) => 100.0,
        _ => 0.0,
    }
}

/// Full marks within commuting range, linear decay to 0 at 400 km.
fn distance_score(candidate: &CandidateRecord, opportunity: &Opportunity) -> f64 {
    const COMMUTE_KM: f64 = 40.0;
    const FAR_KM: f64 = 400.0;

    let (Some(FieldValue::Location(have)), Some(FieldValue::Location(want))) = (
        candidate.field_value("location"),
        opportunity.field_value("location"),
    ) else {
        return 0.0;
    };
    let km = distance_km(have.point, want.point);
    if km <= COMMUTE_KM {
        return 100.0;
    }
    (100.0 * (FAR_KM - km) / (FAR_KM - COMMUTE_KM)).clamp(0.0, 100.0)
}

/// 100 inside the opportunity's experience band, proportional credit below
/// the minimum, a flat 85 above the maximum (overqualified, still placeable).
fn experience_fit(candidate: &CandidateRecord, opportunity: &Opportunity) -> f64 {
    let Some(years) = number(candidate.field_value("experience")) else {
        return 0.0;
    };
    let min = number(opportunity.field_value("min_experience")).unwrap_or(0.0);
    let max = number(opportunity.field_value("max_experience")).unwrap_or(f64::MAX);

    if years < min {
        if min <= 0.0 {
            return 100.0;
        }
        return (100.0 * years / min).clamp(0.0, 100.0);
    }
    if years > max {
        return 85.0;
    }
    100.0
}

/// 100 when the candidate is free by the start date, decaying to 0 when they
/// become available more than 90 days late.
fn availability_overlap(candidate: &CandidateRecord, opportunity: &Opportunity) -> f64 {
    const GRACE_DAYS: f64 = 90.0;

    let (Some(FieldValue::Date(available)), Some(FieldValue::Date(start))) = (
        candidate.field_value("available_from"),
        opportunity.field_value("start_date"),
    ) else {
        return 0.0;
    };
    if available <= start {
        return 100.0;
    }
    let late = (*available - *start).num_days() as f64;
    (100.0 * (GRACE_DAYS - late) / GRACE_DAYS).clamp(0.0, 100.0)
}

/// 100 when the offered rate meets the candidate's desired rate, otherwise
/// the offered fraction of it.
fn compensation_alignment(candidate: &CandidateRecord, opportunity: &Opportunity) -> f64 {
    let (Some(desired), Some(offer)) = (
        number(candidate.field_value("desired_rate")),
        number(opportunity.field_value("offer_rate")),
    ) else {
        return 0.0;
    };
    if desired <= 0.0 || offer >= desired {
        return 100.0;
    }
    (100.0 * offer / desired).clamp(0.0, 100.0)
}

/// Fraction of the opportunity's required licenses the candidate holds.
/// No requirements means full coverage.
fn credential_coverage(candidate: &CandidateRecord, opportunity: &Opportunity) -> f64 {
    let Some(FieldValue::TextSet(required)) = opportunity.field_value("required_licenses") else {
        return 100.0;
    };
    if required.is_empty() {
        return 100.0;
    }
    let held: &[String] = match candidate.field_value("licenses") {
        Some(FieldValue::TextSet(held)) => held,
        _ => &[],
    };
    let covered = required.iter().filter(|item| held.contains(item)).count();
    100.0 * covered as f64 / required.len() as f64
}

fn number(value: Option<&FieldValue>) -> Option<f64> {
    match value {
        Some(FieldValue::Number(v)) => Some(*v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specialty_match_is_exact() {
        let candidate = CandidateRecord::sample("c");
        let opportunity = Opportunity::sample("o");
        assert_eq!(specialty_match(&candidate, &opportunity), 100.0);

        let other = candidate
            .clone()
            .with_field("specialty", FieldValue::Text("Cardiology".to_string()));
        assert_eq!(specialty_match(&other, &opportunity), 0.0);
    }

    #[test]
    fn distance_decays_with_kilometers() {
        let candidate = CandidateRecord::sample("c");
        let opportunity = Opportunity::sample("o");
        // Dallas to Fort Worth is within commuting range.
        assert_eq!(distance_score(&candidate, &opportunity), 100.0);

        let remote = opportunity.clone().with_field(
            "location",
            FieldValue::Location(crate::candidate::Location {
                point: crate::candidate::GeoPoint {
                    lat: 29.7604,
                    lng: -95.3698,
                },
                state: Some("TX".to_string()),
                region: Some("South".to_string()),
            }),
        );
        let score = distance_score(&candidate, &remote);
        assert!(score > 0.0 && score < 100.0, "got {score}");

        let missing = CandidateRecord::new("bare");
        assert_eq!(distance_score(&missing, &opportunity), 0.0);
    }

    #[test]
    fn experience_fit_bands() {
        let opportunity = Opportunity::sample("o"); // band 5-15
        let inside = CandidateRecord::sample("c"); // 8 years
        assert_eq!(experience_fit(&inside, &opportunity), 100.0);

        let junior = inside
            .clone()
            .with_field("experience", FieldValue::Number(2.5));
        assert_eq!(experience_fit(&junior, &opportunity), 50.0);

        let veteran = inside
            .clone()
            .with_field("experience", FieldValue::Number(25.0));
        assert_eq!(experience_fit(&veteran, &opportunity), 85.0);
    }

    #[test]
    fn credential_coverage_is_fractional() {
        let candidate = CandidateRecord::sample("c"); // TX, OK
        let opportunity = Opportunity::sample("o").with_field(
            "required_licenses",
            FieldValue::TextSet(vec!["TX".to_string(), "CA".to_string()]),
        );
        assert_eq!(credential_coverage(&candidate, &opportunity), 50.0);
    }

    #[test]
    fn compensation_alignment_caps_at_full_marks() {
        let candidate = CandidateRecord::sample("c"); // desires 240
        let opportunity = Opportunity::sample("o"); // offers 255
        assert_eq!(compensation_alignment(&candidate, &opportunity), 100.0);

        let lowball = opportunity
            .clone()
            .with_field("offer_rate", FieldValue::Number(120.0));
        assert_eq!(compensation_alignment(&candidate, &lowball), 50.0);
    }

    #[test]
    fn availability_decays_past_start_date() {
        let candidate = CandidateRecord::sample("c"); // available 2026-10-01
        let opportunity = Opportunity::sample("o"); // starts 2026-11-01
        assert_eq!(availability_overlap(&candidate, &opportunity), 100.0);

        let early_start = opportunity.clone().with_field(
            "start_date",
            FieldValue::Date(chrono::NaiveDate::from_ymd_opt(2026, 9, 16).unwrap()),
        );
        // 15 days late out of a 90 day grace window.
        let score = availability_overlap(&candidate, &early_start);
        assert!((score - (100.0 * 75.0 / 90.0)).abs() < 1e-9, "got {score}");
    }
}
