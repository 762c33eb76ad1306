//! Causal evidence graph model.
//!
//! This module provides the typed graph the engines operate on:
//! - [`FailureMode`], [`Observation`], [`SensorReading`]: node variants
//! - [`CausesLink`], [`EvidenceLink`]: ground-truth and evidence edges
//! - [`Confidence`]: the diagnostic confidence lattice
//! - [`ComparisonOperator`] and [`Threshold`]: sensor conditions
//! - [`GraphSnapshot`] and [`DiagnosticGraph`]: serializable input and the
//!   validated, indexed form built from it
//!
//! Nodes are identified by name within their variant. The graph is read-only
//! once constructed; element creation and mutation belong to the external
//! store this crate consumes exports from.

mod snapshot;

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod snapshot_tests;

pub use snapshot::*;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Confidence
// ============================================================================

/// Diagnostic confidence levels.
///
/// Aggregation and ranking use an explicit precedence, not the declaration
/// order: `confirms` outranks `suggests`, which outranks `suggests_against`;
/// `rules_out` eliminates a candidate and never appears in results;
/// `inconclusive` is the contradiction outcome and the no-evidence default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Strong support for the failure mode.
    Confirms,
    /// Weak support for the failure mode.
    Suggests,
    /// Weak evidence against the failure mode.
    SuggestsAgainst,
    /// Strong evidence eliminating the failure mode.
    RulesOut,
    /// Conflicting or absent evidence.
    Inconclusive,
}

impl Confidence {
    /// Get the confidence level as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Confirms => "confirms",
            Confidence::Suggests => "suggests",
            Confidence::SuggestsAgainst => "suggests_against",
            Confidence::RulesOut => "rules_out",
            Confidence::Inconclusive => "inconclusive",
        }
    }

    /// Sort rank for diagnosis results: lower ranks first
    pub fn rank(&self) -> u8 {
        match self {
            Confidence::Confirms => 0,
            Confidence::Suggests => 1,
            Confidence::SuggestsAgainst => 2,
            Confidence::Inconclusive => 3,
            Confidence::RulesOut => 4,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "confirms" => Ok(Confidence::Confirms),
            "suggests" => Ok(Confidence::Suggests),
            "suggests_against" => Ok(Confidence::SuggestsAgainst),
            "rules_out" => Ok(Confidence::RulesOut),
            "inconclusive" => Ok(Confidence::Inconclusive),
            _ => Err(format!("Unknown confidence: {}", s)),
        }
    }
}

// ============================================================================
// Sensor Conditions
// ============================================================================

/// Comparison operators for sensor evidence conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// Equal to a scalar threshold. Accepts `"=="` as an input alias.
    #[serde(rename = "=", alias = "==")]
    Eq,
    /// Less than a scalar threshold.
    #[serde(rename = "<")]
    Lt,
    /// Greater than a scalar threshold.
    #[serde(rename = ">")]
    Gt,
    /// Less than or equal to a scalar threshold.
    #[serde(rename = "<=")]
    Le,
    /// Greater than or equal to a scalar threshold.
    #[serde(rename = ">=")]
    Ge,
    /// Membership in a list threshold.
    #[serde(rename = "in")]
    In,
}

impl ComparisonOperator {
    /// Get the operator as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Le => "<=",
            ComparisonOperator::Ge => ">=",
            ComparisonOperator::In => "in",
        }
    }

    /// Evaluate the condition `value <operator> threshold`.
    ///
    /// Returns `None` when the operator cannot compare against the threshold
    /// shape (a scalar operator against a list, or `in` against a scalar).
    /// Callers surface that pairing as an evaluation error rather than
    /// treating the condition as false.
    pub fn evaluate(&self, value: f64, threshold: &Threshold) -> Option<bool> {
        match (self, threshold) {
            (ComparisonOperator::Eq, Threshold::Value(t)) => Some(value == *t),
            (ComparisonOperator::Lt, Threshold::Value(t)) => Some(value < *t),
            (ComparisonOperator::Gt, Threshold::Value(t)) => Some(value > *t),
            (ComparisonOperator::Le, Threshold::Value(t)) => Some(value <= *t),
            (ComparisonOperator::Ge, Threshold::Value(t)) => Some(value >= *t),
            (ComparisonOperator::In, Threshold::OneOf(ts)) => {
                Some(ts.iter().any(|t| value == *t))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ComparisonOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(ComparisonOperator::Eq),
            "<" => Ok(ComparisonOperator::Lt),
            ">" => Ok(ComparisonOperator::Gt),
            "<=" => Ok(ComparisonOperator::Le),
            ">=" => Ok(ComparisonOperator::Ge),
            "in" => Ok(ComparisonOperator::In),
            _ => Err(format!("Unknown comparison operator: {}", s)),
        }
    }
}

/// Threshold for a sensor evidence condition: a scalar boundary for the
/// ordering operators, or a value list for `in`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    /// Single numeric boundary.
    Value(f64),
    /// Explicit set of accepted values.
    OneOf(Vec<f64>),
}

impl Threshold {
    /// Shape name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Threshold::Value(_) => "scalar",
            Threshold::OneOf(_) => "list",
        }
    }

    /// Every numeric value this threshold mentions, in declaration order
    pub fn values(&self) -> &[f64] {
        match self {
            Threshold::Value(v) => std::slice::from_ref(v),
            Threshold::OneOf(vs) => vs,
        }
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Threshold::Value(v) => write!(f, "{}", v),
            Threshold::OneOf(vs) => {
                write!(f, "[")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
        }
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// Node variant tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A hypothesized root cause.
    FailureMode,
    /// A binary symptom that is either reported or not.
    Observation,
    /// A numeric measurement source.
    SensorReading,
}

impl NodeKind {
    /// Get the node kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::FailureMode => "failure_mode",
            NodeKind::Observation => "observation",
            NodeKind::SensorReading => "sensor_reading",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A hypothesized root cause that explains one or more observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureMode {
    /// Identity assigned by the external store, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Unique name within failure modes.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

impl FailureMode {
    /// Create a failure mode with no store identity
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A binary symptom: present when reported, otherwise unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Identity assigned by the external store, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Unique name within observations.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

impl Observation {
    /// Create an observation with no store identity
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A numeric measurement source, optionally with a unit and labels for
/// discrete readings (for example `"0" -> "OFF"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Identity assigned by the external store, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Unique name within sensor readings.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Measurement unit, if meaningful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Labels for discrete readings, keyed by the reading's canonical
    /// decimal rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_labels: Option<BTreeMap<String, String>>,
}

impl SensorReading {
    /// Create a sensor reading with no unit or value labels
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            unit: None,
            value_labels: None,
        }
    }

    /// Set the measurement unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Add a label for a discrete reading
    pub fn with_value_label(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.value_labels
            .get_or_insert_with(BTreeMap::new)
            .insert(value.into(), label.into());
        self
    }

    /// Look up the label for a reading, if one is defined
    pub fn label_for(&self, value: f64) -> Option<&str> {
        self.value_labels
            .as_ref()
            .and_then(|labels| labels.get(&format_value(value)))
            .map(String::as_str)
    }
}

/// Canonical decimal rendering shared by reports, explanation sentences, and
/// value label lookups.
pub fn format_value(value: f64) -> String {
    format!("{}", value)
}

// ============================================================================
// Edges
// ============================================================================

/// Ground-truth causal edge: the failure mode produces the observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausesLink {
    /// Source failure mode name.
    pub failure_mode: String,
    /// Target observation name.
    pub observation: String,
}

impl CausesLink {
    /// Create a causal edge by node names
    pub fn new(failure_mode: impl Into<String>, observation: impl Into<String>) -> Self {
        Self {
            failure_mode: failure_mode.into(),
            observation: observation.into(),
        }
    }
}

/// Evidence edge source: the node whose state is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum EvidenceSource {
    /// An observation; contributes only when explicitly reported true.
    Observation(String),
    /// A sensor reading; contributes when a value is supplied.
    SensorReading(String),
}

impl EvidenceSource {
    /// Source node name
    pub fn name(&self) -> &str {
        match self {
            EvidenceSource::Observation(name) => name,
            EvidenceSource::SensorReading(name) => name,
        }
    }

    /// Source node kind
    pub fn kind(&self) -> NodeKind {
        match self {
            EvidenceSource::Observation(_) => NodeKind::Observation,
            EvidenceSource::SensorReading(_) => NodeKind::SensorReading,
        }
    }
}

/// Evidence edge: how the source's state bears on a failure mode.
///
/// Sensor-sourced evidence must carry an operator and threshold; this is
/// enforced when the graph is constructed. Observation-sourced evidence
/// carries neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceLink {
    /// Evaluated node.
    pub source: EvidenceSource,
    /// Target failure mode name.
    pub failure_mode: String,
    /// Confidence contributed when the condition holds (or the observation
    /// is reported).
    pub when_true: Confidence,
    /// Confidence contributed when the sensor condition fails.
    pub when_false: Confidence,
    /// Comparison operator for sensor sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<ComparisonOperator>,
    /// Comparison threshold for sensor sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
    /// Short label used as the headline of explanation sentences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Rationale appended to explanations when the condition holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_true_rationale: Option<String>,
    /// Rationale appended to explanations when the condition fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_false_rationale: Option<String>,
}

impl EvidenceLink {
    /// Create observation-sourced evidence
    pub fn from_observation(
        observation: impl Into<String>,
        failure_mode: impl Into<String>,
        when_true: Confidence,
        when_false: Confidence,
    ) -> Self {
        Self {
            source: EvidenceSource::Observation(observation.into()),
            failure_mode: failure_mode.into(),
            when_true,
            when_false,
            operator: None,
            threshold: None,
            label: None,
            when_true_rationale: None,
            when_false_rationale: None,
        }
    }

    /// Create sensor-sourced evidence with its condition
    pub fn from_sensor(
        sensor: impl Into<String>,
        failure_mode: impl Into<String>,
        when_true: Confidence,
        when_false: Confidence,
        operator: ComparisonOperator,
        threshold: Threshold,
    ) -> Self {
        Self {
            source: EvidenceSource::SensorReading(sensor.into()),
            failure_mode: failure_mode.into(),
            when_true,
            when_false,
            operator: Some(operator),
            threshold: Some(threshold),
            label: None,
            when_true_rationale: None,
            when_false_rationale: None,
        }
    }

    /// Set the explanation headline label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the rationale used when the condition holds
    pub fn with_when_true_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.when_true_rationale = Some(rationale.into());
        self
    }

    /// Set the rationale used when the condition fails
    pub fn with_when_false_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.when_false_rationale = Some(rationale.into());
        self
    }

    /// Short rendering used in error messages
    pub(crate) fn describe(&self) -> String {
        format!(
            "evidence edge '{}' -> '{}'",
            self.source.name(),
            self.failure_mode
        )
    }
}
