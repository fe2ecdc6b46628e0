//! Candidate validation and result tally

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::registry::ShapeRegistry;
use crate::schema::Violation;

/// Tally label for candidates whose shape did not match
pub const ERRORS: &str = "errors";
/// Tally label for candidates without a usable or registered `@type`
pub const UNKNOWN_TYPE: &str = "wrong/unknown type";

// =============================================================================
// Tally
// =============================================================================

/// Outcome label -> count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tally(BTreeMap<String, usize>);

impl Default for Tally {
    fn default() -> Self {
        let mut counts = BTreeMap::new();
        counts.insert(ERRORS.to_string(), 0);
        counts.insert(UNKNOWN_TYPE.to_string(), 0);
        Self(counts)
    }
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for a label, 0 when never seen
    pub fn get(&self, label: &str) -> usize {
        self.0.get(label).copied().unwrap_or(0)
    }

    pub fn errors(&self) -> usize {
        self.get(ERRORS)
    }

    pub fn unknown(&self) -> usize {
        self.get(UNKNOWN_TYPE)
    }

    /// Sum over every label
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Successful validations across all types
    pub fn valid(&self) -> usize {
        self.total() - self.errors() - self.unknown()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn as_map(&self) -> &BTreeMap<String, usize> {
        &self.0
    }

    fn record(&mut self, observation: &Observation) {
        let label = match (&observation.outcome, &observation.type_name) {
            (Outcome::Valid, Some(type_name)) => type_name.as_str(),
            (Outcome::Invalid { .. }, _) => ERRORS,
            _ => UNKNOWN_TYPE,
        };
        *self.0.entry(label.to_string()).or_insert(0) += 1;
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("\"{}\": {}", k, v)).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

// =============================================================================
// Observations
// =============================================================================

/// How a single candidate fared
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    Valid,
    Invalid { violations: Vec<Violation> },
    UnknownType {
        #[serde(skip_serializing_if = "Option::is_none")]
        suggestion: Option<&'static str>,
    },
}

/// Per-candidate record, emitted in input order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub index: usize,
    /// The candidate's `@type`, when it was a string
    pub type_name: Option<String>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Observation {
    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, Outcome::Valid)
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::UnknownType { .. } => write!(f, "Script #{} has a wrong/unknown type", self.index),
            _ => write!(
                f,
                "Script #{} of type {} validates {}",
                self.index,
                self.type_name.as_deref().unwrap_or("?"),
                self.is_valid()
            ),
        }
    }
}

/// Everything one run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub tally: Tally,
    pub observations: Vec<Observation>,
}

// =============================================================================
// Validator
// =============================================================================

/// Runs candidates through a [`ShapeRegistry`]
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r ShapeRegistry,
}

impl Default for Validator<'static> {
    fn default() -> Self {
        Self::new(ShapeRegistry::global())
    }
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r ShapeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r ShapeRegistry {
        self.registry
    }

    /// Validate one candidate. Never fails: malformed input becomes an outcome.
    pub fn validate_one(&self, index: usize, candidate: &Value) -> Observation {
        let type_name = declared_type(candidate);

        let shape = type_name.and_then(|t| self.registry.resolve(t));
        let outcome = match (type_name, shape) {
            (Some(_), Some(shape)) => {
                let violations = shape.validate(candidate);
                if violations.is_empty() {
                    Outcome::Valid
                } else {
                    Outcome::Invalid { violations }
                }
            }
            (Some(t), None) => {
                let suggestion = self.registry.suggest(t);
                if let Some(s) = suggestion {
                    warn!(index, type_name = t, "unknown @type, did you mean {}?", s);
                }
                Outcome::UnknownType { suggestion }
            }
            (None, _) => Outcome::UnknownType { suggestion: None },
        };

        let observation = Observation {
            index,
            type_name: type_name.map(String::from),
            outcome,
        };
        debug!(index, valid = observation.is_valid(), "{}", observation);
        observation
    }

    /// Validate candidates in order, handing each observation to `observe`
    pub fn validate_each<F>(&self, candidates: &[Value], mut observe: F) -> Tally
    where
        F: FnMut(&Observation),
    {
        let mut tally = Tally::new();
        for (index, candidate) in candidates.iter().enumerate() {
            let observation = self.validate_one(index, candidate);
            tally.record(&observation);
            observe(&observation);
        }
        tally
    }

    /// Validate candidates in order, keeping every observation
    pub fn validate(&self, candidates: &[Value]) -> ValidationReport {
        let mut observations = Vec::with_capacity(candidates.len());
        let tally = self.validate_each(candidates, |o| observations.push(o.clone()));
        ValidationReport { tally, observations }
    }
}

/// The `@type` of a candidate, if it is an object with a string `@type`
pub fn declared_type(candidate: &Value) -> Option<&str> {
    candidate.as_object()?.get("@type")?.as_str()
}

/// Validate against the default registry
pub fn validate_data(candidates: &[Value]) -> Tally {
    Validator::default().validate_each(candidates, |_| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> Value {
        json!({"@context": "https://schema.org", "@type": "Person", "name": "Jane Doe"})
    }

    #[test]
    fn test_end_to_end_scenario() {
        let data = vec![
            person(),
            json!({"@type": "Unknown"}),
            json!({"@context": "https://schema.org", "@type": "Product", "name": "Widget"}),
        ];
        let tally = validate_data(&data);

        let expected: BTreeMap<String, usize> = [("errors", 1), ("wrong/unknown type", 1), ("Person", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(tally.as_map(), &expected);
    }

    #[test]
    fn test_missing_type_is_unknown_not_error() {
        let tally = validate_data(&[json!({"@context": "https://schema.org", "name": "x"})]);
        assert_eq!(tally.unknown(), 1);
        assert_eq!(tally.errors(), 0);
    }

    #[test]
    fn test_malformed_candidates_are_unknown() {
        let data = vec![
            json!("Person"),
            json!([person()]),
            json!(null),
            json!({"@type": ["Person"], "name": "x"}),
            json!({"@type": 7}),
        ];
        let tally = validate_data(&data);
        assert_eq!(tally.unknown(), 5);
        assert_eq!(tally.total(), 5);
    }

    #[test]
    fn test_success_counted_under_literal_type() {
        let article = |t: &str| {
            json!({
                "@context": "https://schema.org",
                "@type": t,
                "headline": "Hello",
                "image": "https://example.com/a.png",
                "author": {"@type": "Person", "name": "Ann"},
                "publisher": {"@type": "Organization", "name": "Pub"},
                "datePublished": "2024-01-01"
            })
        };
        let tally = validate_data(&[article("Article"), article("BlogPosting"), article("BlogPosting")]);
        assert_eq!(tally.get("Article"), 1);
        assert_eq!(tally.get("BlogPosting"), 2);
        assert_eq!(tally.valid(), 3);
    }

    #[test]
    fn test_observations_in_input_order() {
        let data = vec![json!({}), person(), json!({"@type": "Person"})];
        let report = Validator::default().validate(&data);
        let indices: Vec<usize> = report.observations.iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(matches!(report.observations[0].outcome, Outcome::UnknownType { .. }));
        assert!(report.observations[1].is_valid());
        match &report.observations[2].outcome {
            Outcome::Invalid { violations } => {
                assert!(violations.iter().any(|v| v.path == "$.name"));
                assert!(violations.iter().any(|v| v.path == "$.@context"));
            }
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_suggestion() {
        let obs = Validator::default().validate_one(0, &json!({"@type": "person"}));
        assert_eq!(obs.outcome, Outcome::UnknownType { suggestion: Some("Person") });
        assert_eq!(obs.to_string(), "Script #0 has a wrong/unknown type");
    }

    #[test]
    fn test_observation_display() {
        let obs = Validator::default().validate_one(3, &person());
        assert_eq!(obs.to_string(), "Script #3 of type Person validates true");
    }

    #[test]
    fn test_tally_serializes_as_object() {
        let tally = validate_data(&[person()]);
        let json = serde_json::to_value(&tally).unwrap();
        assert_eq!(json, json!({"errors": 0, "wrong/unknown type": 0, "Person": 1}));
    }
}
