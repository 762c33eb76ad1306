//! Unit tests for snapshot validation and graph indexing.
//!
//! Tests construction from records and JSON, every structural error,
//! and the adjacency accessors the engines rely on.

use super::*;

use crate::error::GraphError;

fn device_snapshot() -> GraphSnapshot {
    GraphSnapshot {
        nodes: vec![
            FailureMode::new("Dead Battery", "Battery has no charge").into(),
            FailureMode::new("Device Off", "Power switch is off").into(),
            Observation::new("No Music", "No music is playing").into(),
            Observation::new("No Lights", "Status lights are dark").into(),
            SensorReading::new("battery_voltage", "Battery voltage")
                .with_unit("V")
                .into(),
        ],
        edges: vec![
            EdgeRecord::causes("Dead Battery", "No Music"),
            EdgeRecord::causes("Dead Battery", "No Lights"),
            EdgeRecord::causes("Device Off", "No Music"),
            EdgeRecord::evidence(EvidenceLink::from_sensor(
                "battery_voltage",
                "Dead Battery",
                Confidence::Confirms,
                Confidence::RulesOut,
                ComparisonOperator::Lt,
                Threshold::Value(4.0),
            )),
            EdgeRecord::evidence(EvidenceLink::from_observation(
                "No Lights",
                "Dead Battery",
                Confidence::Suggests,
                Confidence::Inconclusive,
            )),
        ],
    }
}

// ============================================================================
// Construction tests
// ============================================================================

#[test]
fn test_from_snapshot_builds_indices() {
    let graph = DiagnosticGraph::from_snapshot(device_snapshot()).unwrap();

    assert_eq!(graph.failure_modes().len(), 2);
    assert_eq!(graph.observations().len(), 2);
    assert_eq!(graph.sensors().len(), 1);

    assert_eq!(graph.failure_mode("Dead Battery").unwrap().name, "Dead Battery");
    assert_eq!(graph.observation("No Music").unwrap().name, "No Music");
    assert_eq!(graph.sensor("battery_voltage").unwrap().unit.as_deref(), Some("V"));
    assert!(graph.failure_mode("Unknown").is_none());
}

#[test]
fn test_node_order_is_preserved() {
    let graph = DiagnosticGraph::from_snapshot(device_snapshot()).unwrap();
    let names: Vec<&str> = graph.failure_modes().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Dead Battery", "Device Off"]);
}

#[test]
fn test_adjacency_accessors() {
    let graph = DiagnosticGraph::from_snapshot(device_snapshot()).unwrap();

    let caused: Vec<&str> = graph
        .causes_from("Dead Battery")
        .map(|c| c.observation.as_str())
        .collect();
    assert_eq!(caused, vec!["No Music", "No Lights"]);

    let causers: Vec<&str> = graph
        .causes_of("No Music")
        .map(|c| c.failure_mode.as_str())
        .collect();
    assert_eq!(causers, vec!["Dead Battery", "Device Off"]);

    let evidence: Vec<&str> = graph
        .evidence_for("Dead Battery")
        .map(|e| e.source.name())
        .collect();
    assert_eq!(evidence, vec!["battery_voltage", "No Lights"]);

    assert_eq!(graph.evidence_for("Device Off").count(), 0);
}

#[test]
fn test_same_name_allowed_across_variants() {
    let snapshot = GraphSnapshot {
        nodes: vec![
            FailureMode::new("power", "Failure mode named power").into(),
            Observation::new("power", "Observation named power").into(),
            SensorReading::new("power", "Sensor named power").into(),
        ],
        edges: vec![],
    };
    let graph = DiagnosticGraph::from_snapshot(snapshot).unwrap();
    assert!(graph.failure_mode("power").is_some());
    assert!(graph.observation("power").is_some());
    assert!(graph.sensor("power").is_some());
}

// ============================================================================
// Validation error tests
// ============================================================================

#[test]
fn test_duplicate_node_rejected() {
    let snapshot = GraphSnapshot {
        nodes: vec![
            FailureMode::new("Dead Battery", "first").into(),
            FailureMode::new("Dead Battery", "second").into(),
        ],
        edges: vec![],
    };
    let err = DiagnosticGraph::from_snapshot(snapshot).unwrap_err();
    assert!(matches!(err, GraphError::DuplicateNode { .. }));
    assert_eq!(err.to_string(), "Duplicate failure_mode node: Dead Battery");
}

#[test]
fn test_causes_edge_to_missing_node_rejected() {
    let snapshot = GraphSnapshot {
        nodes: vec![FailureMode::new("Dead Battery", "no charge").into()],
        edges: vec![EdgeRecord::causes("Dead Battery", "No Music")],
    };
    let err = DiagnosticGraph::from_snapshot(snapshot).unwrap_err();
    assert!(matches!(err, GraphError::UnknownNode { .. }));
    assert!(err.to_string().contains("observation node 'No Music'"));
}

#[test]
fn test_causes_edge_target_must_be_observation() {
    let snapshot = GraphSnapshot {
        nodes: vec![
            FailureMode::new("Dead Battery", "no charge").into(),
            SensorReading::new("battery_voltage", "voltage").into(),
        ],
        edges: vec![EdgeRecord::Causes {
            source: NodeRef::failure_mode("Dead Battery"),
            target: NodeRef::sensor_reading("battery_voltage"),
        }],
    };
    let err = DiagnosticGraph::from_snapshot(snapshot).unwrap_err();
    assert!(matches!(err, GraphError::InvalidEndpoint { .. }));
    assert!(err.to_string().contains("target must be an observation"));
}

#[test]
fn test_causes_edge_source_must_be_failure_mode() {
    let snapshot = GraphSnapshot {
        nodes: vec![
            Observation::new("No Music", "silence").into(),
            Observation::new("No Lights", "dark").into(),
        ],
        edges: vec![EdgeRecord::Causes {
            source: NodeRef::observation("No Music"),
            target: NodeRef::observation("No Lights"),
        }],
    };
    let err = DiagnosticGraph::from_snapshot(snapshot).unwrap_err();
    assert!(err.to_string().contains("source must be a failure mode"));
}

#[test]
fn test_evidence_edge_target_must_be_failure_mode() {
    let snapshot = GraphSnapshot {
        nodes: vec![
            Observation::new("No Music", "silence").into(),
            Observation::new("No Lights", "dark").into(),
        ],
        edges: vec![EdgeRecord::EvidenceFor {
            source: NodeRef::observation("No Lights"),
            target: NodeRef::observation("No Music"),
            when_true: Confidence::Suggests,
            when_false: Confidence::Inconclusive,
            operator: None,
            threshold: None,
            label: None,
            when_true_rationale: None,
            when_false_rationale: None,
        }],
    };
    let err = DiagnosticGraph::from_snapshot(snapshot).unwrap_err();
    assert!(err.to_string().contains("target must be a failure mode"));
}

#[test]
fn test_evidence_edge_source_must_not_be_failure_mode() {
    let snapshot = GraphSnapshot {
        nodes: vec![
            FailureMode::new("Dead Battery", "no charge").into(),
            FailureMode::new("Device Off", "switched off").into(),
        ],
        edges: vec![EdgeRecord::EvidenceFor {
            source: NodeRef::failure_mode("Device Off"),
            target: NodeRef::failure_mode("Dead Battery"),
            when_true: Confidence::Suggests,
            when_false: Confidence::Inconclusive,
            operator: None,
            threshold: None,
            label: None,
            when_true_rationale: None,
            when_false_rationale: None,
        }],
    };
    let err = DiagnosticGraph::from_snapshot(snapshot).unwrap_err();
    assert!(err
        .to_string()
        .contains("source must be an observation or sensor reading"));
}

#[test]
fn test_sensor_evidence_requires_operator_and_threshold() {
    let mut link = EvidenceLink::from_sensor(
        "battery_voltage",
        "Dead Battery",
        Confidence::Confirms,
        Confidence::RulesOut,
        ComparisonOperator::Lt,
        Threshold::Value(4.0),
    );
    link.operator = None;

    let snapshot = GraphSnapshot {
        nodes: vec![
            FailureMode::new("Dead Battery", "no charge").into(),
            SensorReading::new("battery_voltage", "voltage").into(),
        ],
        edges: vec![EdgeRecord::evidence(link)],
    };
    let err = DiagnosticGraph::from_snapshot(snapshot).unwrap_err();
    assert!(matches!(err, GraphError::MissingSensorCondition { .. }));
    assert_eq!(
        err.to_string(),
        "Sensor evidence 'battery_voltage' for failure mode 'Dead Battery' is missing operator or threshold"
    );
}

#[test]
fn test_sensor_evidence_missing_threshold_rejected() {
    let mut link = EvidenceLink::from_sensor(
        "battery_voltage",
        "Dead Battery",
        Confidence::Confirms,
        Confidence::RulesOut,
        ComparisonOperator::Lt,
        Threshold::Value(4.0),
    );
    link.threshold = None;

    let snapshot = GraphSnapshot {
        nodes: vec![
            FailureMode::new("Dead Battery", "no charge").into(),
            SensorReading::new("battery_voltage", "voltage").into(),
        ],
        edges: vec![EdgeRecord::evidence(link)],
    };
    let err = DiagnosticGraph::from_snapshot(snapshot).unwrap_err();
    assert!(matches!(err, GraphError::MissingSensorCondition { .. }));
}

#[test]
fn test_observation_evidence_needs_no_condition() {
    let snapshot = GraphSnapshot {
        nodes: vec![
            FailureMode::new("Dead Battery", "no charge").into(),
            Observation::new("No Lights", "dark").into(),
        ],
        edges: vec![EdgeRecord::evidence(EvidenceLink::from_observation(
            "No Lights",
            "Dead Battery",
            Confidence::Suggests,
            Confidence::Inconclusive,
        ))],
    };
    assert!(DiagnosticGraph::from_snapshot(snapshot).is_ok());
}

// ============================================================================
// JSON tests
// ============================================================================

#[test]
fn test_from_json_accepts_store_export() {
    let json = r#"{
        "nodes": [
            {"kind": "failure_mode", "name": "Dead Battery", "description": "Battery has no charge"},
            {"kind": "observation", "name": "No Music", "description": "No music is playing"},
            {"kind": "sensor_reading", "name": "battery_voltage", "description": "Battery voltage", "unit": "V"}
        ],
        "edges": [
            {
                "kind": "causes",
                "source": {"kind": "failure_mode", "name": "Dead Battery"},
                "target": {"kind": "observation", "name": "No Music"}
            },
            {
                "kind": "evidence_for",
                "source": {"kind": "sensor_reading", "name": "battery_voltage"},
                "target": {"kind": "failure_mode", "name": "Dead Battery"},
                "when_true": "confirms",
                "when_false": "rules_out",
                "operator": "==",
                "threshold": 4.0
            }
        ]
    }"#;

    let graph = DiagnosticGraph::from_json(json).unwrap();
    let evidence: Vec<&EvidenceLink> = graph.evidence_for("Dead Battery").collect();
    assert_eq!(evidence.len(), 1);
    assert_eq!(evidence[0].operator, Some(ComparisonOperator::Eq));
    assert_eq!(evidence[0].threshold, Some(Threshold::Value(4.0)));
    assert_eq!(evidence[0].when_false, Confidence::RulesOut);
}

#[test]
fn test_from_json_rejects_unknown_confidence() {
    let json = r#"{
        "nodes": [
            {"kind": "failure_mode", "name": "Dead Battery", "description": "d"},
            {"kind": "observation", "name": "No Music", "description": "d"}
        ],
        "edges": [
            {
                "kind": "evidence_for",
                "source": {"kind": "observation", "name": "No Music"},
                "target": {"kind": "failure_mode", "name": "Dead Battery"},
                "when_true": "probably",
                "when_false": "inconclusive"
            }
        ]
    }"#;

    let err = DiagnosticGraph::from_json(json).unwrap_err();
    assert!(matches!(err, GraphError::Snapshot(_)));
}

#[test]
fn test_snapshot_serde_round_trip() {
    let snapshot = device_snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back = GraphSnapshot::from_json(&json).unwrap();
    assert_eq!(back, snapshot);
}
