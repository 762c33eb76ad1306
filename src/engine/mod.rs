//! Diagnosis engine.
//!
//! This module provides the inference operations over a validated graph:
//! - [`DiagnosticEngine::diagnose`]: ranked failure-mode diagnosis
//! - [`DiagnosticEngine::explain`] and [`DiagnosticEngine::explain_text`]:
//!   per-evidence explanation records and the rendered form
//! - [`DiagnosticEngine::causal_paths`]: causal links behind a diagnosis
//! - [`DiagnosticEngine::recommend`]: next most informative tests
//!
//! All operations are synchronous and read-only; engine clones share one
//! graph. [`Assignment`] is the common input: the set of observations
//! reported true plus the sensor values actually measured. Anything absent
//! from an assignment is unknown, not false.

mod aggregate;
mod diagnose;
mod explain;
mod recommend;

pub use aggregate::*;
pub use diagnose::*;
pub use explain::*;
pub use recommend::*;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::DiagnosticResult;
use crate::graph::{DiagnosticGraph, GraphSnapshot};

// ============================================================================
// Assignment
// ============================================================================

/// One concrete situation to diagnose: which observations are reported true
/// and which sensor values were measured.
///
/// Observation and sensor names that do not exist in the graph are inert.
/// An observation not in the set is unknown; a sensor without an entry has
/// no reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Names of observations reported true.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub observations: BTreeSet<String>,
    /// Measured sensor values by sensor name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sensor_values: BTreeMap<String, f64>,
}

impl Assignment {
    /// Create an empty assignment
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one true observation
    pub fn with_observation(mut self, name: impl Into<String>) -> Self {
        self.observations.insert(name.into());
        self
    }

    /// Add several true observations
    pub fn with_observations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.observations.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add one measured sensor value
    pub fn with_sensor(mut self, name: impl Into<String>, value: f64) -> Self {
        self.sensor_values.insert(name.into(), value);
        self
    }

    /// Whether an observation is reported true
    pub fn has_observation(&self, name: &str) -> bool {
        self.observations.contains(name)
    }

    /// The measured value for a sensor, if any
    pub fn sensor_value(&self, name: &str) -> Option<f64> {
        self.sensor_values.get(name).copied()
    }

    /// Order-independent identity for expectation registry lookups
    pub fn canonical_key(&self) -> CaseKey {
        let observations = self.observations.iter().cloned().collect();
        let sensors = self
            .sensor_values
            .iter()
            .map(|(name, &value)| {
                // fold -0.0 into 0.0 so key equality matches value equality
                let normalized = if value == 0.0 { 0.0 } else { value };
                (name.clone(), normalized.to_bits())
            })
            .collect();
        CaseKey {
            observations,
            sensors,
        }
    }
}

/// Canonical identity of an assignment.
///
/// Built from sorted observation names and sorted sensor entries keyed by
/// value bit pattern, so equal inputs hash equally regardless of the order
/// they were assembled in, and lookups are exact on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaseKey {
    observations: Vec<String>,
    sensors: Vec<(String, u64)>,
}

// ============================================================================
// Engine
// ============================================================================

/// Diagnostic inference engine over a validated graph.
///
/// Cheap to clone; clones share the graph. The graph is never mutated.
#[derive(Debug, Clone)]
pub struct DiagnosticEngine {
    graph: Arc<DiagnosticGraph>,
    config: Config,
}

impl DiagnosticEngine {
    /// Create an engine with default configuration
    pub fn new(graph: DiagnosticGraph) -> Self {
        Self::with_config(graph, Config::default())
    }

    /// Create an engine with explicit configuration
    pub fn with_config(graph: DiagnosticGraph, config: Config) -> Self {
        Self {
            graph: Arc::new(graph),
            config,
        }
    }

    /// Validate a snapshot and create an engine over it
    pub fn from_snapshot(snapshot: GraphSnapshot) -> DiagnosticResult<Self> {
        Ok(Self::new(DiagnosticGraph::from_snapshot(snapshot)?))
    }

    /// The underlying graph
    pub fn graph(&self) -> &DiagnosticGraph {
        &self.graph
    }

    /// The engine configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_builders() {
        let assignment = Assignment::new()
            .with_observation("No Music")
            .with_observations(["No Lights", "No Music"])
            .with_sensor("battery_voltage", 3.5);

        assert_eq!(assignment.observations.len(), 2);
        assert!(assignment.has_observation("No Music"));
        assert!(assignment.has_observation("No Lights"));
        assert!(!assignment.has_observation("No Sound"));
        assert_eq!(assignment.sensor_value("battery_voltage"), Some(3.5));
        assert_eq!(assignment.sensor_value("switch_status"), None);
    }

    #[test]
    fn test_canonical_key_is_order_independent() {
        let a = Assignment::new()
            .with_observation("No Music")
            .with_observation("No Lights")
            .with_sensor("a", 1.0)
            .with_sensor("b", 2.0);
        let b = Assignment::new()
            .with_sensor("b", 2.0)
            .with_observation("No Lights")
            .with_sensor("a", 1.0)
            .with_observation("No Music");

        assert_eq!(a.canonical_key(), b.canonical_key());
    }

    #[test]
    fn test_canonical_key_distinguishes_values_and_names() {
        let base = Assignment::new().with_sensor("a", 1.0);
        assert_ne!(
            base.canonical_key(),
            Assignment::new().with_sensor("a", 1.1).canonical_key()
        );
        assert_ne!(
            base.canonical_key(),
            Assignment::new().with_sensor("b", 1.0).canonical_key()
        );
        assert_ne!(
            base.canonical_key(),
            Assignment::new()
                .with_sensor("a", 1.0)
                .with_observation("No Music")
                .canonical_key()
        );
    }

    #[test]
    fn test_canonical_key_normalizes_negative_zero() {
        let positive = Assignment::new().with_sensor("a", 0.0);
        let negative = Assignment::new().with_sensor("a", -0.0);
        assert_eq!(positive.canonical_key(), negative.canonical_key());
    }

    #[test]
    fn test_assignment_serde_defaults() {
        let assignment: Assignment = serde_json::from_str("{}").unwrap();
        assert!(assignment.observations.is_empty());
        assert!(assignment.sensor_values.is_empty());

        let assignment: Assignment = serde_json::from_str(
            r#"{"observations": ["No Music"], "sensor_values": {"battery_voltage": 3.5}}"#,
        )
        .unwrap();
        assert!(assignment.has_observation("No Music"));
        assert_eq!(assignment.sensor_value("battery_voltage"), Some(3.5));
    }
}
