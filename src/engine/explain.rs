//! Explanation records, rendered explanations, and causal paths.
//!
//! Explanations re-run evidence aggregation for a single failure mode and
//! turn each contribution into a human sentence. A labeled evidence edge
//! supplies its own headline; otherwise a template names the source, the
//! reading, and the condition outcome. The rendered form groups sentences
//! by polarity and strength tier and appends the causal links that connect
//! the failure mode to the reported symptoms.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::DiagnosticResult;
use crate::graph::{format_value, ComparisonOperator, Confidence, NodeKind, Threshold};

use super::{Assignment, DiagnosticEngine, EvidenceContribution, Polarity};

/// One piece of evidence explaining a diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceExplanation {
    /// Evidence source name.
    pub name: String,
    /// Evidence source kind.
    pub kind: NodeKind,
    /// Sensor condition operator, when the source is a sensor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<ComparisonOperator>,
    /// Sensor condition threshold, when the source is a sensor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
    /// Measured value the condition was evaluated against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<f64>,
    /// Strength the outcome contributed.
    pub strength: Confidence,
    /// Direction of the contribution.
    pub polarity: Polarity,
    /// Human-readable sentence for this evidence.
    pub sentence: String,
}

/// A causal chain from a failure mode to a reported observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalPath {
    /// Origin failure mode name.
    pub failure_mode: String,
    /// Reported observation the chain reaches.
    pub observation: String,
    /// Nodes between origin and observation, in chain order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intermediate_nodes: Vec<String>,
}

impl DiagnosticEngine {
    /// Explain how the assignment's evidence bears on one failure mode.
    ///
    /// An unknown failure-mode name yields an empty list, not an error.
    pub fn explain(
        &self,
        failure_mode: &str,
        assignment: &Assignment,
    ) -> DiagnosticResult<Vec<EvidenceExplanation>> {
        if self.graph().failure_mode(failure_mode).is_none() {
            return Ok(Vec::new());
        }
        let contributions = self.contributions_for(failure_mode, assignment)?;
        Ok(contributions
            .into_iter()
            .map(|c| self.explanation_from(failure_mode, c))
            .collect())
    }

    fn explanation_from(
        &self,
        failure_mode: &str,
        contribution: EvidenceContribution,
    ) -> EvidenceExplanation {
        let sentence = self.sentence_for(failure_mode, &contribution);
        EvidenceExplanation {
            name: contribution.source.name().to_string(),
            kind: contribution.source.kind(),
            operator: contribution.operator,
            threshold: contribution.threshold,
            actual_value: contribution.actual_value,
            strength: contribution.strength,
            polarity: contribution.polarity,
            sentence,
        }
    }

    fn sentence_for(&self, failure_mode: &str, contribution: &EvidenceContribution) -> String {
        let headline = match &contribution.label {
            Some(label) => label.clone(),
            None => self.template_sentence(failure_mode, contribution),
        };
        match &contribution.rationale {
            Some(rationale) => format!("{} - {}", headline, rationale),
            None => headline,
        }
    }

    fn template_sentence(&self, failure_mode: &str, contribution: &EvidenceContribution) -> String {
        let name = contribution.source.name();
        if contribution.source.kind() == NodeKind::Observation {
            return format!(
                "Observation \"{}\" is evidence for \"{}\"",
                name, failure_mode
            );
        }
        if let (Some(operator), Some(threshold), Some(value)) = (
            contribution.operator,
            contribution.threshold.as_ref(),
            contribution.actual_value,
        ) {
            let reading = match self
                .graph()
                .sensor(name)
                .and_then(|sensor| sensor.label_for(value))
            {
                Some(label) => format!("{} ({})", format_value(value), label),
                None => format_value(value),
            };
            let held = contribution.polarity == Polarity::Supporting;
            format!(
                "Sensor \"{}\" reading {} {}",
                name,
                reading,
                condition_clause(operator, threshold, held)
            )
        } else {
            format!("Sensor \"{}\" is evidence for \"{}\"", name, failure_mode)
        }
    }

    /// Causal chains from a failure mode to any reported observation.
    ///
    /// The walk follows causal edges in graph order and is cycle-safe. In a
    /// validated graph every chain is a direct link, so
    /// `intermediate_nodes` is empty.
    pub fn causal_paths(
        &self,
        failure_mode: &str,
        observations: &BTreeSet<String>,
    ) -> Vec<CausalPath> {
        let mut paths = Vec::new();
        let mut trail = Vec::new();
        self.walk_causes(failure_mode, failure_mode, observations, &mut trail, &mut paths);
        paths
    }

    fn walk_causes(
        &self,
        origin: &str,
        node: &str,
        observations: &BTreeSet<String>,
        trail: &mut Vec<String>,
        paths: &mut Vec<CausalPath>,
    ) {
        for link in self.graph().causes_from(node) {
            let next = link.observation.as_str();
            if trail.iter().any(|seen| seen == next) {
                continue;
            }
            if observations.contains(next) {
                paths.push(CausalPath {
                    failure_mode: origin.to_string(),
                    observation: next.to_string(),
                    intermediate_nodes: trail.clone(),
                });
            }
            trail.push(next.to_string());
            self.walk_causes(origin, next, observations, trail, paths);
            trail.pop();
        }
    }

    /// Render a grouped, human-readable explanation for one failure mode.
    pub fn explain_text(
        &self,
        failure_mode: &str,
        assignment: &Assignment,
    ) -> DiagnosticResult<String> {
        let evidence = self.explain(failure_mode, assignment)?;
        if evidence.is_empty() {
            return Ok(format!(
                "No evidence was found to explain the diagnosis of '{}'.",
                failure_mode
            ));
        }

        let supporting: Vec<&EvidenceExplanation> = evidence
            .iter()
            .filter(|e| e.polarity == Polarity::Supporting)
            .collect();
        let contradicting: Vec<&EvidenceExplanation> = evidence
            .iter()
            .filter(|e| e.polarity == Polarity::Contradicting)
            .collect();

        let mut text = format!("Explanation for diagnosis: '{}'\n\n", failure_mode);

        if supporting.is_empty() {
            text.push_str("No evidence was found supporting this diagnosis.\n");
        } else {
            text.push_str("Evidence supporting this diagnosis:\n");
            append_tier(&mut text, "Strong confirmations:", &supporting, Confidence::Confirms);
            append_tier(&mut text, "Suggestive evidence:", &supporting, Confidence::Suggests);
        }

        if contradicting.is_empty() {
            text.push_str("\nNo evidence was found contradicting this diagnosis.\n");
        } else {
            text.push_str("\nEvidence contradicting this diagnosis:\n");
            append_tier(&mut text, "Strong contradictions:", &contradicting, Confidence::RulesOut);
            append_tier(
                &mut text,
                "Mild contradictions:",
                &contradicting,
                Confidence::SuggestsAgainst,
            );
        }

        let paths = self.causal_paths(failure_mode, &assignment.observations);
        if !paths.is_empty() {
            text.push_str("\nCausal links from this failure mode to the observed symptoms:\n\n");
            for (i, path) in paths.iter().enumerate() {
                text.push_str(&format!("Path {}:\n", i + 1));
                text.push_str(&format!(
                    "- {} CAUSES {}\n",
                    path.failure_mode, path.observation
                ));
                for node in &path.intermediate_nodes {
                    text.push_str(&format!("  └─> {}\n", node));
                }
            }
        }

        Ok(text)
    }
}

/// Append one strength tier under its header, when it has members.
fn append_tier(
    text: &mut String,
    header: &str,
    evidence: &[&EvidenceExplanation],
    strength: Confidence,
) {
    let members: Vec<_> = evidence.iter().filter(|e| e.strength == strength).collect();
    if members.is_empty() {
        return;
    }
    text.push_str(&format!("\n{}\n", header));
    for member in members {
        text.push_str(&format!("- {}\n", member.sentence));
    }
}

fn condition_clause(operator: ComparisonOperator, threshold: &Threshold, held: bool) -> String {
    match (operator, held) {
        (ComparisonOperator::Eq, true) => format!("equals threshold {}", threshold),
        (ComparisonOperator::Eq, false) => format!("does NOT equal threshold {}", threshold),
        (ComparisonOperator::Lt, true) => format!("is less than threshold {}", threshold),
        (ComparisonOperator::Lt, false) => format!("is NOT less than threshold {}", threshold),
        (ComparisonOperator::Gt, true) => format!("is greater than threshold {}", threshold),
        (ComparisonOperator::Gt, false) => format!("is NOT greater than threshold {}", threshold),
        (ComparisonOperator::Le, true) => format!("is at most threshold {}", threshold),
        (ComparisonOperator::Le, false) => format!("is NOT at most threshold {}", threshold),
        (ComparisonOperator::Ge, true) => format!("is at least threshold {}", threshold),
        (ComparisonOperator::Ge, false) => format!("is NOT at least threshold {}", threshold),
        (ComparisonOperator::In, true) => format!("is one of {}", threshold),
        (ComparisonOperator::In, false) => format!("is NOT one of {}", threshold),
    }
}
