//! Ranked failure-mode diagnosis.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::DiagnosticResult;
use crate::graph::Confidence;

use super::{combine_confidence, Assignment, DiagnosticEngine, Polarity};

/// One diagnosed failure mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Diagnosed failure mode name.
    pub failure_mode: String,
    /// Aggregated confidence.
    pub confidence: Confidence,
    /// Names of evidence sources that argued for the mode.
    pub supporting_evidence: Vec<String>,
    /// Names of evidence sources that argued against the mode.
    pub contradicting_evidence: Vec<String>,
    /// Rendered explanation, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl DiagnosticEngine {
    /// Diagnose an assignment into a ranked list of failure modes.
    ///
    /// Candidates are failure modes causally linked to at least one reported
    /// observation. A contradicting rule-out (or an aggregate of `rules_out`)
    /// removes a candidate from the output entirely; any other contradiction
    /// yields `inconclusive`. Results sort by confidence rank, ties keeping
    /// graph order. An empty observation set yields an empty list.
    pub fn diagnose(&self, assignment: &Assignment) -> DiagnosticResult<Vec<Diagnosis>> {
        self.run_diagnosis(assignment, self.config().engine.include_explanations)
    }

    /// Diagnose with a rendered explanation attached to every result
    pub fn diagnose_explained(&self, assignment: &Assignment) -> DiagnosticResult<Vec<Diagnosis>> {
        self.run_diagnosis(assignment, true)
    }

    fn run_diagnosis(
        &self,
        assignment: &Assignment,
        include_explanations: bool,
    ) -> DiagnosticResult<Vec<Diagnosis>> {
        debug!(
            observations = assignment.observations.len(),
            sensor_values = assignment.sensor_values.len(),
            "Running diagnosis"
        );

        let mut results = Vec::new();
        for failure_mode in self.graph().failure_modes() {
            let is_candidate = self
                .graph()
                .causes_from(&failure_mode.name)
                .any(|link| assignment.has_observation(&link.observation));
            if !is_candidate {
                continue;
            }

            let contributions = self.contributions_for(&failure_mode.name, assignment)?;
            let Some(confidence) = combine_confidence(&contributions) else {
                continue;
            };
            if confidence == Confidence::RulesOut {
                // supporting evidence whose outcome rules the mode out
                continue;
            }

            let supporting_evidence = contributions
                .iter()
                .filter(|c| c.polarity == Polarity::Supporting)
                .map(|c| c.source.name().to_string())
                .collect();
            let contradicting_evidence = contributions
                .iter()
                .filter(|c| c.polarity == Polarity::Contradicting)
                .map(|c| c.source.name().to_string())
                .collect();

            results.push(Diagnosis {
                failure_mode: failure_mode.name.clone(),
                confidence,
                supporting_evidence,
                contradicting_evidence,
                explanation: None,
            });
        }

        // stable sort: ties keep graph order
        results.sort_by_key(|d| d.confidence.rank());

        if include_explanations {
            for result in &mut results {
                result.explanation = Some(self.explain_text(&result.failure_mode, assignment)?);
            }
        }

        info!(results = results.len(), "Diagnosis complete");
        Ok(results)
    }
}
