//! Combinatorial truth-table verification.
//!
//! This module exercises a diagnostic graph across systematically generated
//! input combinations and diffs the outcomes against registered
//! expectations:
//! - [`TruthTable::generate_cases`]: power set of varied observations
//!   crossed with probe values around every known sensor threshold
//! - [`TruthTable::register_expectation`]: exact-input expectations
//! - [`TruthTable::run`] / [`TruthTable::run_cases`]: batch evaluation,
//!   optionally on the rayon thread pool, always in case order
//! - [`format_results`]: plain text, delimited, markup, and fixed-width
//!   rendering
//!
//! Cases without a registered expectation are never flagged as surprises;
//! a failing case is recorded against its row and never aborts the batch.

mod report;

pub use report::*;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::{Assignment, CaseKey, DiagnosticEngine};
use crate::graph::{ComparisonOperator, Confidence, EvidenceSource, Threshold};

// ============================================================================
// Types
// ============================================================================

/// A failure mode paired with a confidence, as diagnosed or as expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Failure mode name.
    pub failure_mode: String,
    /// Confidence attached to it.
    pub confidence: Confidence,
}

impl Verdict {
    /// Create a verdict
    pub fn new(failure_mode: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            failure_mode: failure_mode.into(),
            confidence,
        }
    }
}

///// A registered test case: exact inputs and the verdicts they should yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Exact inputs the expectation applies to.
    pub inputs: Assignment,
    /// Verdicts the diagnosis should produce for those inputs.
    pub expected: Vec<Verdict>,
}

/// Outcome of one evaluated case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOutcome {
    /// The inputs that were diagnosed.
    pub inputs: Assignment,
    /// Verdicts the engine produced, in rank order.
    pub diagnosed: Vec<Verdict>,
    /// Registered expectation for these exact inputs, if any.
    pub expected: Vec<Verdict>,
    /// Diagnosed verdicts the expectation did not list.
    pub unexpected: Vec<Verdict>,
    /// Expected verdicts the diagnosis did not produce.
    pub missing: Vec<Verdict>,
    /// Whether a registered expectation was contradicted.
    pub has_surprise: bool,
    /// Failure recorded for this case, if diagnosis errored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What a sensor can be probed with: its unit and every threshold and
/// operator mentioned by evidence edges reading it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorProfile {
    /// Sensor name.
    pub name: String,
    /// Measurement unit, if the sensor declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Known threshold values, deduplicated in discovery order. Members of
    /// list thresholds count individually.
    pub thresholds: Vec<f64>,
    /// Operators seen on the sensor's evidence edges, deduplicated in
    /// discovery order.
    pub operators: Vec<ComparisonOperator>,
}

/// Selection of what to vary and what to hold fixed when generating cases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CasePlan {
    /// Observations to vary through their power set. When both this and
    /// `fixed_observations` are empty, the whole observation universe is
    /// varied.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vary_observations: Vec<String>,
    /// Observations held true in every case.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub fixed_observations: BTreeSet<String>,
    /// Sensors to vary through probe values around their known thresholds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vary_sensors: Vec<String>,
    /// Sensor values held fixed in every case; these override varied values
    /// on collision.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fixed_sensor_values: BTreeMap<String, f64>,
}

impl CasePlan {
    /// Create an empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Vary one observation
    pub fn with_varied_observation(mut self, name: impl Into<String>) -> Self {
        self.vary_observations.push(name.into());
        self
    }

    /// Hold one observation true in every case
    pub fn with_fixed_observation(mut self, name: impl Into<String>) -> Self {
        self.fixed_observations.insert(name.into());
        self
    }

    /// Vary one sensor
    pub fn with_varied_sensor(mut self, name: impl Into<String>) -> Self {
        self.vary_sensors.push(name.into());
        self
    }

    /// Hold one sensor at a fixed value in every case
    pub fn with_fixed_sensor(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fixed_sensor_values.insert(name.into(), value);
        self
    }
}

// ============================================================================
// Truth Table
// ============================================================================

/// Truth-table generator and runner over one diagnostic engine.
#[derive(Debug, Clone)]
pub struct TruthTable {
    engine: DiagnosticEngine,
    observations: Vec<String>,
    sensors: Vec<SensorProfile>,
    sensor_index: HashMap<String, usize>,
    expectations: HashMap<CaseKey, Vec<Verdict>>,
}

impl TruthTable {
    /// Scan the engine's graph once and build the input universe.
    pub fn new(engine: DiagnosticEngine) -> Self {
        let observations: Vec<String> = engine
            .graph()
            .observations()
            .iter()
            .map(|o| o.name.clone())
            .collect();

        let mut sensors: Vec<SensorProfile> = Vec::new();
        let mut sensor_index: HashMap<String, usize> = HashMap::new();
        for link in engine.graph().evidence() {
            let EvidenceSource::SensorReading(name) = &link.source else {
                continue;
            };
            let at = match sensor_index.get(name) {
                Some(&at) => at,
                None => {
                    sensor_index.insert(name.clone(), sensors.len());
                    sensors.push(SensorProfile {
                        name: name.clone(),
                        unit: engine.graph().sensor(name).and_then(|s| s.unit.clone()),
                        thresholds: Vec::new(),
                        operators: Vec::new(),
                    });
                    sensors.len() - 1
                }
            };
            let profile = &mut sensors[at];
            if let Some(threshold) = &link.threshold {
                for &value in threshold.values() {
                    if !profile.thresholds.contains(&value) {
                        profile.thresholds.push(value);
                    }
                }
            }
            if let Some(operator) = link.operator {
                if !profile.operators.contains(&operator) {
                    profile.operators.push(operator);
                }
            }
        }

        debug!(
            observations = observations.len(),
            sensors = sensors.len(),
            "Scanned graph for truth table universe"
        );

        Self {
            engine,
            observations,
            sensors,
            sensor_index,
            expectations: HashMap::new(),
        }
    }

    /// The observation universe, in graph order
    pub fn observation_universe(&self) -> &[String] {
        &self.observations
    }

    /// Every sensor with evidence edges, in graph order
    pub fn sensor_profiles(&self) -> &[SensorProfile] {
        &self.sensors
    }

    /// Look up one sensor's profile
    pub fn sensor_profile(&self, name: &str) -> Option<&SensorProfile> {
        self.sensor_index.get(name).map(|&i| &self.sensors[i])
    }

    /// Number of registered expectations
    pub fn expectation_count(&self) -> usize {
        self.expectations.len()
    }

    /// Register the expected verdicts for one exact input combination.
    ///
    /// Registration is keyed by the canonical form of the inputs;
    /// re-registering the same inputs replaces the previous expectation.
    pub fn register_expectation(&mut self, test_case: TestCase) {
        self.expectations
            .insert(test_case.inputs.canonical_key(), test_case.expected);
    }

    /// Generate the case list for a plan.
    ///
    /// The observation side is the full power set of the varied
    /// observations (empty set first, then ascending size in input order),
    /// each unioned with the fixed observations. The sensor side probes
    /// every varied sensor just below, at, and just above each known
    /// threshold, plus a case with the sensor absent, crossed across
    /// sensors in input order. Fixed sensor values apply last. Unknown
    /// sensor names contribute nothing.
    pub fn generate_cases(&self, plan: &CasePlan) -> Vec<Assignment> {
        let universe;
        let vary_observations: &[String] =
            if plan.vary_observations.is_empty() && plan.fixed_observations.is_empty() {
                universe = self.observations.clone();
                &universe
            } else {
                &plan.vary_observations
            };

        let mut observation_combinations: Vec<Vec<&String>> = vec![Vec::new()];
        for size in 1..=vary_observations.len() {
            collect_combinations(vary_observations, size, &mut observation_combinations);
        }

        let delta = self.engine.config().truth_table.probe_delta;
        let mut sensor_combinations: Vec<BTreeMap<String, f64>> = vec![BTreeMap::new()];
        for name in &plan.vary_sensors {
            let Some(profile) = self.sensor_profile(name) else {
                continue;
            };
            let mut values: Vec<Option<f64>> = Vec::new();
            for &threshold in &profile.thresholds {
                values.push(Some(threshold - delta));
                values.push(Some(threshold));
                values.push(Some(threshold + delta));
            }
            // absent marker: the sensor reports nothing in this case
            values.push(None);

            let mut next = Vec::with_capacity(sensor_combinations.len() * values.len());
            for existing in &sensor_combinations {
                for value in &values {
                    let mut combination = existing.clone();
                    if let Some(value) = value {
                        combination.insert(name.clone(), *value);
                    }
                    next.push(combination);
                }
            }
            sensor_combinations = next;
        }

        let mut cases = Vec::with_capacity(observation_combinations.len() * sensor_combinations.len());
        for observation_combination in &observation_combinations {
            let mut observations: BTreeSet<String> = observation_combination
                .iter()
                .map(|name| (*name).clone())
                .collect();
            observations.extend(plan.fixed_observations.iter().cloned());

            for sensor_combination in &sensor_combinations {
                let mut sensor_values = sensor_combination.clone();
                for (name, &value) in &plan.fixed_sensor_values {
                    sensor_values.insert(name.clone(), value);
                }
                cases.push(Assignment {
                    observations: observations.clone(),
                    sensor_values,
                });
            }
        }

        debug!(cases = cases.len(), "Generated truth table cases");
        cases
    }

    /// Evaluate one case and diff it against any registered expectation.
    ///
    /// A diagnosis failure is recorded on the outcome instead of being
    /// returned, so batch runs continue past it.
    pub fn run_case(&self, inputs: &Assignment) -> CaseOutcome {
        let (diagnosed, error) = match self.engine.diagnose(inputs) {
            Ok(results) => (
                results
                    .into_iter()
                    .map(|d| Verdict {
                        failure_mode: d.failure_mode,
                        confidence: d.confidence,
                    })
                    .collect::<Vec<_>>(),
                None,
            ),
            Err(err) => {
                warn!(error = %err, "Truth table case failed");
                (Vec::new(), Some(err.to_string()))
            }
        };

        let registered = self.expectations.get(&inputs.canonical_key());
        let expected = registered.cloned().unwrap_or_default();
        let (unexpected, missing) = if registered.is_some() {
            (
                diagnosed
                    .iter()
                    .filter(|v| !expected.contains(v))
                    .cloned()
                    .collect::<Vec<_>>(),
                expected
                    .iter()
                    .filter(|v| !diagnosed.contains(v))
                    .cloned()
                    .collect::<Vec<_>>(),
            )
        } else {
            (Vec::new(), Vec::new())
        };

        let has_surprise =
            registered.is_some() && (!unexpected.is_empty() || !missing.is_empty());

        CaseOutcome {
            inputs: inputs.clone(),
            diagnosed,
            expected,
            unexpected,
            missing,
            has_surprise,
            error,
        }
    }

    /// Evaluate explicit cases in order.
    ///
    /// With `truth_table.parallel` set, cases run on the rayon thread pool;
    /// outcomes are collected in case order either way.
    pub fn run_cases(&self, cases: &[Assignment]) -> Vec<CaseOutcome> {
        let outcomes: Vec<CaseOutcome> = if self.engine.config().truth_table.parallel {
            cases.par_iter().map(|case| self.run_case(case)).collect()
        } else {
            cases.iter().map(|case| self.run_case(case)).collect()
        };

        info!(
            cases = outcomes.len(),
            surprises = outcomes.iter().filter(|o| o.has_surprise).count(),
            failures = outcomes.iter().filter(|o| o.error.is_some()).count(),
            "Truth table run complete"
        );
        outcomes
    }

    /// Generate a plan's cases and evaluate them
    pub fn run(&self, plan: &CasePlan) -> Vec<CaseOutcome> {
        let cases = self.generate_cases(plan);
        self.run_cases(&cases)
    }

    /// Whether any outcome contradicted its registered expectation
    pub fn has_surprises(&self, outcomes: &[CaseOutcome]) -> bool {
        outcomes.iter().any(|o| o.has_surprise)
    }
}

/// Append every `size`-element combination of `items`, preserving input
/// order within each combination.
fn collect_combinations<'a>(
    items: &'a [String],
    size: usize,
    out: &mut Vec<Vec<&'a String>>,
) {
    fn recurse<'a>(
        items: &'a [String],
        size: usize,
        start: usize,
        current: &mut Vec<&'a String>,
        out: &mut Vec<Vec<&'a String>>,
    ) {
        if current.len() == size {
            out.push(current.clone());
            return;
        }
        for i in start..items.len() {
            current.push(&items[i]);
            recurse(items, size, i + 1, current, out);
            current.pop();
        }
    }
    let mut current = Vec::with_capacity(size);
    recurse(items, size, 0, &mut current, out);
}
