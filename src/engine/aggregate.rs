//! Evidence aggregation shared by diagnosis and explanation.
//!
//! For one failure mode and one assignment, every evidence edge yields at
//! most one [`EvidenceContribution`]: observations contribute their
//! when-true strength only when reported, sensors contribute their
//! when-true or when-false strength depending on the condition outcome, and
//! sources absent from the assignment contribute nothing.

use serde::{Deserialize, Serialize};

use crate::error::{DiagnosticResult, EvaluationError};
use crate::graph::{ComparisonOperator, Confidence, EvidenceSource, Threshold};

use super::{Assignment, DiagnosticEngine};

/// Confidence precedence used when combining supporting contributions.
pub(crate) const SUPPORT_PRECEDENCE: [Confidence; 4] = [
    Confidence::Confirms,
    Confidence::Suggests,
    Confidence::SuggestsAgainst,
    Confidence::RulesOut,
];

/// Whether a contribution argues for or against the failure mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// The condition held (or the observation was reported).
    Supporting,
    /// A sensor condition failed.
    Contradicting,
}

impl Polarity {
    /// Get the polarity as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Supporting => "supporting",
            Polarity::Contradicting => "contradicting",
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One evidence edge's contribution under an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceContribution {
    /// The evaluated source node.
    pub source: EvidenceSource,
    /// Strength contributed by the outcome.
    pub strength: Confidence,
    /// Direction of the contribution.
    pub polarity: Polarity,
    /// Operator of the sensor condition, if the source is a sensor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<ComparisonOperator>,
    /// Threshold of the sensor condition, if the source is a sensor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
    /// The measured value the condition was evaluated against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<f64>,
    /// Headline label carried by the evidence edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Rationale matching the outcome (when-true or when-false).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl DiagnosticEngine {
    /// Collect the contributions of every evidence edge targeting a failure
    /// mode under the given assignment.
    ///
    /// Contributions appear in graph order. Unknown source names in the
    /// assignment are inert; an operator that cannot evaluate its threshold
    /// shape is an error, never a false outcome.
    pub fn contributions_for(
        &self,
        failure_mode: &str,
        assignment: &Assignment,
    ) -> DiagnosticResult<Vec<EvidenceContribution>> {
        let mut contributions = Vec::new();

        for link in self.graph().evidence_for(failure_mode) {
            match &link.source {
                EvidenceSource::Observation(name) => {
                    if !assignment.has_observation(name) {
                        continue;
                    }
                    contributions.push(EvidenceContribution {
                        source: link.source.clone(),
                        strength: link.when_true,
                        polarity: Polarity::Supporting,
                        operator: None,
                        threshold: None,
                        actual_value: None,
                        label: link.label.clone(),
                        rationale: link.when_true_rationale.clone(),
                    });
                }
                EvidenceSource::SensorReading(name) => {
                    let Some(value) = assignment.sensor_value(name) else {
                        continue;
                    };
                    // both present for sensor sources, enforced at construction
                    let (Some(operator), Some(threshold)) =
                        (link.operator, link.threshold.as_ref())
                    else {
                        continue;
                    };
                    let held = operator.evaluate(value, threshold).ok_or_else(|| {
                        EvaluationError::UnsupportedCondition {
                            sensor: name.clone(),
                            failure_mode: failure_mode.to_string(),
                            operator: operator.as_str().to_string(),
                            threshold_kind: threshold.kind().to_string(),
                        }
                    })?;
                    let (strength, polarity, rationale) = if held {
                        (
                            link.when_true,
                            Polarity::Supporting,
                            link.when_true_rationale.clone(),
                        )
                    } else {
                        (
                            link.when_false,
                            Polarity::Contradicting,
                            link.when_false_rationale.clone(),
                        )
                    };
                    contributions.push(EvidenceContribution {
                        source: link.source.clone(),
                        strength,
                        polarity,
                        operator: Some(operator),
                        threshold: Some(threshold.clone()),
                        actual_value: Some(value),
                        label: link.label.clone(),
                        rationale,
                    });
                }
            }
        }

        Ok(contributions)
    }
}

/// Combine contributions into the candidate's overall confidence.
///
/// `None` means a contradicting rule-out eliminated the candidate. Any other
/// contradiction forces `inconclusive`. Otherwise the strongest supporting
/// strength wins by precedence, with `inconclusive` as the no-evidence
/// default.
pub(crate) fn combine_confidence(contributions: &[EvidenceContribution]) -> Option<Confidence> {
    let ruled_out = contributions
        .iter()
        .any(|c| c.polarity == Polarity::Contradicting && c.strength == Confidence::RulesOut);
    if ruled_out {
        return None;
    }

    if contributions
        .iter()
        .any(|c| c.polarity == Polarity::Contradicting)
    {
        return Some(Confidence::Inconclusive);
    }

    for strength in SUPPORT_PRECEDENCE {
        if contributions
            .iter()
            .any(|c| c.polarity == Polarity::Supporting && c.strength == strength)
        {
            return Some(strength);
        }
    }

    Some(Confidence::Inconclusive)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(strength: Confidence, polarity: Polarity) -> EvidenceContribution {
        EvidenceContribution {
            source: EvidenceSource::Observation("evidence".to_string()),
            strength,
            polarity,
            operator: None,
            threshold: None,
            actual_value: None,
            label: None,
            rationale: None,
        }
    }

    #[test]
    fn test_contradicting_rule_out_eliminates() {
        let contributions = vec![
            contribution(Confidence::Confirms, Polarity::Supporting),
            contribution(Confidence::RulesOut, Polarity::Contradicting),
        ];
        assert_eq!(combine_confidence(&contributions), None);
    }

    #[test]
    fn test_any_contradiction_forces_inconclusive() {
        let contributions = vec![
            contribution(Confidence::Confirms, Polarity::Supporting),
            contribution(Confidence::SuggestsAgainst, Polarity::Contradicting),
        ];
        assert_eq!(
            combine_confidence(&contributions),
            Some(Confidence::Inconclusive)
        );
    }

    #[test]
    fn test_supporting_precedence_prefers_confirms() {
        let contributions = vec![
            contribution(Confidence::Suggests, Polarity::Supporting),
            contribution(Confidence::Confirms, Polarity::Supporting),
        ];
        assert_eq!(
            combine_confidence(&contributions),
            Some(Confidence::Confirms)
        );
    }

    #[test]
    fn test_supporting_precedence_falls_through() {
        let contributions = vec![contribution(Confidence::SuggestsAgainst, Polarity::Supporting)];
        assert_eq!(
            combine_confidence(&contributions),
            Some(Confidence::SuggestsAgainst)
        );
    }

    #[test]
    fn test_supporting_rule_out_surfaces_for_caller_filter() {
        let contributions = vec![contribution(Confidence::RulesOut, Polarity::Supporting)];
        assert_eq!(
            combine_confidence(&contributions),
            Some(Confidence::RulesOut)
        );
    }

    #[test]
    fn test_no_contributions_is_inconclusive() {
        assert_eq!(combine_confidence(&[]), Some(Confidence::Inconclusive));
    }

    #[test]
    fn test_inconclusive_support_does_not_outrank_default() {
        let contributions = vec![contribution(Confidence::Inconclusive, Polarity::Supporting)];
        assert_eq!(
            combine_confidence(&contributions),
            Some(Confidence::Inconclusive)
        );
    }

    #[test]
    fn test_polarity_display() {
        assert_eq!(Polarity::Supporting.to_string(), "supporting");
        assert_eq!(Polarity::Contradicting.to_string(), "contradicting");
    }
}
