//! Snapshot records and the validated, indexed graph built from them.
//!
//! A [`GraphSnapshot`] is the serializable export consumed from the external
//! graph store. [`DiagnosticGraph::from_snapshot`] validates every structural
//! invariant up front and builds the adjacency indices the engines read, so
//! no query re-derives structure per call.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

use super::{
    CausesLink, Confidence, ComparisonOperator, EvidenceLink, EvidenceSource, FailureMode,
    NodeKind, Observation, SensorReading, Threshold,
};

// ============================================================================
// Snapshot Records
// ============================================================================

/// Reference to a node by variant and name, as edges carry it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    /// Node variant.
    pub kind: NodeKind,
    /// Node name within the variant.
    pub name: String,
}

impl NodeRef {
    /// Reference a failure mode by name
    pub fn failure_mode(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::FailureMode,
            name: name.into(),
        }
    }

    /// Reference an observation by name
    pub fn observation(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Observation,
            name: name.into(),
        }
    }

    /// Reference a sensor reading by name
    pub fn sensor_reading(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::SensorReading,
            name: name.into(),
        }
    }
}

/// One node in a snapshot, tagged by variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeRecord {
    /// A failure mode node.
    FailureMode(FailureMode),
    /// An observation node.
    Observation(Observation),
    /// A sensor reading node.
    SensorReading(SensorReading),
}

impl From<FailureMode> for NodeRecord {
    fn from(node: FailureMode) -> Self {
        NodeRecord::FailureMode(node)
    }
}

impl From<Observation> for NodeRecord {
    fn from(node: Observation) -> Self {
        NodeRecord::Observation(node)
    }
}

impl From<SensorReading> for NodeRecord {
    fn from(node: SensorReading) -> Self {
        NodeRecord::SensorReading(node)
    }
}

/// One edge in a snapshot, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeRecord {
    /// Ground-truth causal edge.
    Causes {
        /// Causing node; must reference a failure mode.
        source: NodeRef,
        /// Caused node; must reference an observation.
        target: NodeRef,
    },
    /// Evidence edge.
    EvidenceFor {
        /// Evaluated node; must reference an observation or sensor reading.
        source: NodeRef,
        /// Target node; must reference a failure mode.
        target: NodeRef,
        /// Confidence contributed when the condition holds.
        when_true: Confidence,
        /// Confidence contributed when the condition fails.
        when_false: Confidence,
        /// Comparison operator, required for sensor sources.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operator: Option<ComparisonOperator>,
        /// Comparison threshold, required for sensor sources.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        threshold: Option<Threshold>,
        /// Explanation headline label.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// Rationale when the condition holds.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        when_true_rationale: Option<String>,
        /// Rationale when the condition fails.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        when_false_rationale: Option<String>,
    },
}

impl EdgeRecord {
    /// Create a causal edge record by node names
    pub fn causes(failure_mode: impl Into<String>, observation: impl Into<String>) -> Self {
        EdgeRecord::Causes {
            source: NodeRef::failure_mode(failure_mode),
            target: NodeRef::observation(observation),
        }
    }

    /// Create an evidence edge record from a typed evidence link
    pub fn evidence(link: EvidenceLink) -> Self {
        let source = NodeRef {
            kind: link.source.kind(),
            name: link.source.name().to_string(),
        };
        EdgeRecord::EvidenceFor {
            source,
            target: NodeRef::failure_mode(link.failure_mode),
            when_true: link.when_true,
            when_false: link.when_false,
            operator: link.operator,
            threshold: link.threshold,
            label: link.label,
            when_true_rationale: link.when_true_rationale,
            when_false_rationale: link.when_false_rationale,
        }
    }

    fn describe(&self) -> String {
        match self {
            EdgeRecord::Causes { source, target } => {
                format!("causes edge '{}' -> '{}'", source.name, target.name)
            }
            EdgeRecord::EvidenceFor { source, target, .. } => {
                format!("evidence edge '{}' -> '{}'", source.name, target.name)
            }
        }
    }
}

/// Serializable export of a causal evidence graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// All nodes, in store order.
    pub nodes: Vec<NodeRecord>,
    /// All edges, in store order.
    pub edges: Vec<EdgeRecord>,
}

impl GraphSnapshot {
    /// Parse a snapshot from its JSON export
    pub fn from_json(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Validated Graph
// ============================================================================

/// Validated, indexed causal evidence graph.
///
/// Construction order is preserved everywhere: node accessors iterate in
/// snapshot order, and that order is the discovery order all engine
/// tie-breaks refer to. The graph is immutable once built.
#[derive(Debug, Clone)]
pub struct DiagnosticGraph {
    failure_modes: Vec<FailureMode>,
    observations: Vec<Observation>,
    sensors: Vec<SensorReading>,
    failure_mode_index: HashMap<String, usize>,
    observation_index: HashMap<String, usize>,
    sensor_index: HashMap<String, usize>,
    causes: Vec<CausesLink>,
    evidence: Vec<EvidenceLink>,
    causes_by_failure_mode: HashMap<String, Vec<usize>>,
    causes_by_observation: HashMap<String, Vec<usize>>,
    evidence_by_failure_mode: HashMap<String, Vec<usize>>,
}

impl DiagnosticGraph {
    /// Validate a snapshot and build the indexed graph.
    ///
    /// Fails fast on the first violation: duplicate names within a variant,
    /// edge references to absent nodes, endpoint variant mismatches, or
    /// sensor evidence without operator and threshold.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> GraphResult<Self> {
        let mut graph = DiagnosticGraph {
            failure_modes: Vec::new(),
            observations: Vec::new(),
            sensors: Vec::new(),
            failure_mode_index: HashMap::new(),
            observation_index: HashMap::new(),
            sensor_index: HashMap::new(),
            causes: Vec::new(),
            evidence: Vec::new(),
            causes_by_failure_mode: HashMap::new(),
            causes_by_observation: HashMap::new(),
            evidence_by_failure_mode: HashMap::new(),
        };

        for record in snapshot.nodes {
            graph.insert_node(record)?;
        }
        for record in snapshot.edges {
            graph.insert_edge(record)?;
        }

        Ok(graph)
    }

    /// Parse and validate a snapshot from its JSON export
    pub fn from_json(json: &str) -> GraphResult<Self> {
        Self::from_snapshot(GraphSnapshot::from_json(json)?)
    }

    fn insert_node(&mut self, record: NodeRecord) -> GraphResult<()> {
        match record {
            NodeRecord::FailureMode(node) => {
                if self.failure_mode_index.contains_key(&node.name) {
                    return Err(duplicate(NodeKind::FailureMode, &node.name));
                }
                self.failure_mode_index
                    .insert(node.name.clone(), self.failure_modes.len());
                self.failure_modes.push(node);
            }
            NodeRecord::Observation(node) => {
                if self.observation_index.contains_key(&node.name) {
                    return Err(duplicate(NodeKind::Observation, &node.name));
                }
                self.observation_index
                    .insert(node.name.clone(), self.observations.len());
                self.observations.push(node);
            }
            NodeRecord::SensorReading(node) => {
                if self.sensor_index.contains_key(&node.name) {
                    return Err(duplicate(NodeKind::SensorReading, &node.name));
                }
                self.sensor_index
                    .insert(node.name.clone(), self.sensors.len());
                self.sensors.push(node);
            }
        }
        Ok(())
    }

    fn insert_edge(&mut self, record: EdgeRecord) -> GraphResult<()> {
        let edge = record.describe();
        match record {
            EdgeRecord::Causes { source, target } => {
                if source.kind != NodeKind::FailureMode {
                    return Err(GraphError::InvalidEndpoint {
                        edge,
                        reason: "source must be a failure mode".to_string(),
                    });
                }
                if target.kind != NodeKind::Observation {
                    return Err(GraphError::InvalidEndpoint {
                        edge,
                        reason: "target must be an observation".to_string(),
                    });
                }
                self.require_node(&source, &edge)?;
                self.require_node(&target, &edge)?;

                let index = self.causes.len();
                self.causes_by_failure_mode
                    .entry(source.name.clone())
                    .or_default()
                    .push(index);
                self.causes_by_observation
                    .entry(target.name.clone())
                    .or_default()
                    .push(index);
                self.causes.push(CausesLink {
                    failure_mode: source.name,
                    observation: target.name,
                });
            }
            EdgeRecord::EvidenceFor {
                source,
                target,
                when_true,
                when_false,
                operator,
                threshold,
                label,
                when_true_rationale,
                when_false_rationale,
            } => {
                if target.kind != NodeKind::FailureMode {
                    return Err(GraphError::InvalidEndpoint {
                        edge,
                        reason: "target must be a failure mode".to_string(),
                    });
                }
                self.require_node(&target, &edge)?;
                self.require_node(&source, &edge)?;

                let evidence_source = match source.kind {
                    NodeKind::Observation => EvidenceSource::Observation(source.name),
                    NodeKind::SensorReading => {
                        if operator.is_none() || threshold.is_none() {
                            return Err(GraphError::MissingSensorCondition {
                                sensor: source.name,
                                failure_mode: target.name,
                            });
                        }
                        EvidenceSource::SensorReading(source.name)
                    }
                    NodeKind::FailureMode => {
                        return Err(GraphError::InvalidEndpoint {
                            edge,
                            reason: "source must be an observation or sensor reading".to_string(),
                        });
                    }
                };

                let index = self.evidence.len();
                self.evidence_by_failure_mode
                    .entry(target.name.clone())
                    .or_default()
                    .push(index);
                self.evidence.push(EvidenceLink {
                    source: evidence_source,
                    failure_mode: target.name,
                    when_true,
                    when_false,
                    operator,
                    threshold,
                    label,
                    when_true_rationale,
                    when_false_rationale,
                });
            }
        }
        Ok(())
    }

    fn require_node(&self, node: &NodeRef, edge: &str) -> GraphResult<()> {
        let known = match node.kind {
            NodeKind::FailureMode => self.failure_mode_index.contains_key(&node.name),
            NodeKind::Observation => self.observation_index.contains_key(&node.name),
            NodeKind::SensorReading => self.sensor_index.contains_key(&node.name),
        };
        if known {
            Ok(())
        } else {
            Err(GraphError::UnknownNode {
                kind: node.kind.as_str().to_string(),
                name: node.name.clone(),
                edge: edge.to_string(),
            })
        }
    }

    /// All failure modes in snapshot order
    pub fn failure_modes(&self) -> &[FailureMode] {
        &self.failure_modes
    }

    /// All observations in snapshot order
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// All sensor readings in snapshot order
    pub fn sensors(&self) -> &[SensorReading] {
        &self.sensors
    }

    /// Look up a failure mode by name
    pub fn failure_mode(&self, name: &str) -> Option<&FailureMode> {
        self.failure_mode_index
            .get(name)
            .map(|&i| &self.failure_modes[i])
    }

    /// Look up an observation by name
    pub fn observation(&self, name: &str) -> Option<&Observation> {
        self.observation_index
            .get(name)
            .map(|&i| &self.observations[i])
    }

    /// Look up a sensor reading by name
    pub fn sensor(&self, name: &str) -> Option<&SensorReading> {
        self.sensor_index.get(name).map(|&i| &self.sensors[i])
    }

    /// All causal edges in snapshot order
    pub fn causes(&self) -> &[CausesLink] {
        &self.causes
    }

    /// All evidence edges in snapshot order
    pub fn evidence(&self) -> &[EvidenceLink] {
        &self.evidence
    }

    /// Causal edges leaving a failure mode, in snapshot order
    pub fn causes_from<'a>(&'a self, failure_mode: &str) -> impl Iterator<Item = &'a CausesLink> {
        self.causes_by_failure_mode
            .get(failure_mode)
            .into_iter()
            .flatten()
            .map(|&i| &self.causes[i])
    }

    /// Causal edges arriving at an observation, in snapshot order
    pub fn causes_of<'a>(&'a self, observation: &str) -> impl Iterator<Item = &'a CausesLink> {
        self.causes_by_observation
            .get(observation)
            .into_iter()
            .flatten()
            .map(|&i| &self.causes[i])
    }

    /// Evidence edges targeting a failure mode, in snapshot order
    pub fn evidence_for<'a>(&'a self, failure_mode: &str) -> impl Iterator<Item = &'a EvidenceLink> {
        self.evidence_by_failure_mode
            .get(failure_mode)
            .into_iter()
            .flatten()
            .map(|&i| &self.evidence[i])
    }
}

fn duplicate(kind: NodeKind, name: &str) -> GraphError {
    GraphError::DuplicateNode {
        kind: kind.as_str().to_string(),
        name: name.to_string(),
    }
}
