//! # Diagnostic Reasoning
//!
//! A diagnostic inference engine over causal evidence graphs, paired with a
//! combinatorial truth-table harness that verifies graph behavior across
//! generated input combinations.
//!
//! ## Features
//!
//! - **Causal Evidence Graphs**: failure modes, observations, and sensor
//!   readings joined by causal and evidence edges, validated and indexed at
//!   load
//! - **Diagnosis**: ranked failure-mode candidates from reported symptoms
//!   and measured sensor values, with confidence aggregation across all
//!   evidence
//! - **Explanations**: per-evidence sentences, causal paths back to the
//!   symptoms, and a rendered explanation text for any diagnosis
//! - **Test Recommendations**: which unmeasured evidence source to check
//!   next, ranked by how many candidate modes it discriminates
//! - **Truth Tables**: power-set case generation over observations and
//!   threshold probes over sensors, diffed against registered expectations
//! - **Reporting**: text, CSV, HTML, and fixed-width table rendering of
//!   truth-table outcomes
//!
//! ## Architecture
//!
//! ```text
//! GraphSnapshot (JSON) → DiagnosticGraph → DiagnosticEngine
//!                                               ↓
//!                            diagnose / explain / recommend
//!                                               ↓
//!                        TruthTable → CaseOutcome → format_results
//! ```
//!
//! ## Example
//!
//! ```
//! use diagnostic_reasoning::{Assignment, DiagnosticEngine};
//! use diagnostic_reasoning::scenarios;
//!
//! # fn main() -> Result<(), diagnostic_reasoning::DiagnosticError> {
//! let engine = DiagnosticEngine::from_snapshot(scenarios::basic_device())?;
//! let findings = engine.diagnose(
//!     &Assignment::new()
//!         .with_observation("No Music")
//!         .with_sensor("battery_voltage", 3.2),
//! )?;
//! assert_eq!(findings[0].failure_mode, "Dead Battery");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Runtime configuration sourced from the environment.
pub mod config;
/// Diagnosis, explanation, and test recommendation over a loaded graph.
pub mod engine;
/// Error types and result aliases for the crate.
pub mod error;
/// Graph model: nodes, edges, snapshots, and validation.
pub mod graph;
/// Built-in diagnostic scenarios.
pub mod scenarios;
/// Combinatorial truth-table verification and reporting.
pub mod truth_table;

pub use config::Config;
pub use engine::{Assignment, DiagnosticEngine};
pub use error::{DiagnosticError, DiagnosticResult};
pub use graph::{DiagnosticGraph, GraphSnapshot};
