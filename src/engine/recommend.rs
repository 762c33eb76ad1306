//! Next-test recommendation.
//!
//! Given the observations reported so far, rank the evidence sources not yet
//! checked by how many candidate failure modes they would discriminate
//! between. No conditions are evaluated here; recommendations only read
//! graph structure.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{ComparisonOperator, Confidence, NodeKind, Threshold};

use super::DiagnosticEngine;

/// One recommended check, ranked by discriminative power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecommendation {
    /// Evidence source to check next.
    pub name: String,
    /// Source kind: observation to confirm or sensor to read.
    pub kind: NodeKind,
    /// Condition operator, when the source is a sensor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<ComparisonOperator>,
    /// Condition threshold, when the source is a sensor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
    /// Confidence the source would contribute if its condition held.
    pub strength_if_true: Confidence,
    /// Candidate failure modes this check would bear on.
    pub would_help_with: Vec<String>,
}

impl DiagnosticEngine {
    /// Recommend the most informative next checks for the reported
    /// observations.
    ///
    /// Walks every evidence edge targeting a candidate failure mode, skips
    /// sources already in the observation set, and groups the rest by
    /// source. Groups keep discovery order; the first edge seen supplies the
    /// condition and strength. Results sort by how many candidates they
    /// would help with, most first.
    pub fn recommend(&self, observations: &BTreeSet<String>) -> Vec<TestRecommendation> {
        let mut recommendations: Vec<TestRecommendation> = Vec::new();
        let mut index: HashMap<(NodeKind, String), usize> = HashMap::new();

        for failure_mode in self.graph().failure_modes() {
            let is_candidate = self
                .graph()
                .causes_from(&failure_mode.name)
                .any(|link| observations.contains(&link.observation));
            if !is_candidate {
                continue;
            }

            for link in self.graph().evidence_for(&failure_mode.name) {
                if observations.contains(link.source.name()) {
                    continue;
                }
                let key = (link.source.kind(), link.source.name().to_string());
                match index.get(&key) {
                    Some(&at) => {
                        let group = &mut recommendations[at];
                        if !group.would_help_with.iter().any(|n| n == &failure_mode.name) {
                            group.would_help_with.push(failure_mode.name.clone());
                        }
                    }
                    None => {
                        index.insert(key, recommendations.len());
                        recommendations.push(TestRecommendation {
                            name: link.source.name().to_string(),
                            kind: link.source.kind(),
                            operator: link.operator,
                            threshold: link.threshold.clone(),
                            strength_if_true: link.when_true,
                            would_help_with: vec![failure_mode.name.clone()],
                        });
                    }
                }
            }
        }

        // stable sort: ties keep discovery order
        recommendations.sort_by_key(|r| std::cmp::Reverse(r.would_help_with.len()));

        debug!(
            observations = observations.len(),
            recommendations = recommendations.len(),
            "Ranked next tests"
        );
        recommendations
    }
}
