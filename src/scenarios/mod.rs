//! Built-in diagnostic scenarios for demonstration and testing.

use crate::graph::{
    ComparisonOperator, Confidence, EdgeRecord, EvidenceLink, FailureMode, GraphSnapshot,
    Observation, SensorReading, Threshold,
};

/// Toy-device scenario with four competing failure modes.
///
/// Failure modes:
/// - Dead Battery, confirmed by battery voltage under 4 V
/// - Mute Mode, confirmed by the mode switch reading MUTE
/// - Speaker Broken, suggested by buzzing or hissing
/// - Device Off, confirmed by the mode switch reading OFF
///
/// All four cause "No Music", so reporting it alone leaves every mode a
/// candidate and sensor readings discriminate between them.
pub fn basic_device() -> GraphSnapshot {
    GraphSnapshot {
        nodes: vec![
            FailureMode::new(
                "Dead Battery",
                "Battery voltage is too low to power the device",
            )
            .into(),
            FailureMode::new("Mute Mode", "Device is in mute mode").into(),
            FailureMode::new(
                "Speaker Broken",
                "Speaker hardware is damaged or disconnected",
            )
            .into(),
            FailureMode::new("Device Off", "Device is powered off").into(),
            Observation::new("No Music", "No sound is playing from the device").into(),
            Observation::new("Buzz or Hiss", "Unwanted noise coming from the speaker").into(),
            SensorReading::new("battery_voltage", "Current battery voltage")
                .with_unit("V")
                .into(),
            SensorReading::new("switch_status", "Position of the mode switch")
                .with_unit("enum")
                .with_value_label("0", "OFF")
                .with_value_label("1", "ON")
                .with_value_label("2", "MUTE")
                .into(),
        ],
        edges: vec![
            EdgeRecord::causes("Dead Battery", "No Music"),
            EdgeRecord::causes("Mute Mode", "No Music"),
            EdgeRecord::causes("Speaker Broken", "No Music"),
            EdgeRecord::causes("Speaker Broken", "Buzz or Hiss"),
            EdgeRecord::causes("Device Off", "No Music"),
            EdgeRecord::evidence(
                EvidenceLink::from_sensor(
                    "battery_voltage",
                    "Dead Battery",
                    Confidence::Confirms,
                    Confidence::RulesOut,
                    ComparisonOperator::Lt,
                    Threshold::Value(4.0),
                )
                .with_label("Low battery voltage"),
            ),
            EdgeRecord::evidence(
                EvidenceLink::from_sensor(
                    "switch_status",
                    "Device Off",
                    Confidence::Confirms,
                    Confidence::SuggestsAgainst,
                    ComparisonOperator::Eq,
                    Threshold::Value(0.0),
                )
                .with_label("Switch position indicates device state"),
            ),
            EdgeRecord::evidence(
                EvidenceLink::from_sensor(
                    "switch_status",
                    "Mute Mode",
                    Confidence::Confirms,
                    Confidence::SuggestsAgainst,
                    ComparisonOperator::Eq,
                    Threshold::Value(2.0),
                )
                .with_label("Switch position indicates mute state"),
            ),
            EdgeRecord::evidence(
                EvidenceLink::from_observation(
                    "Buzz or Hiss",
                    "Speaker Broken",
                    Confidence::Suggests,
                    Confidence::Inconclusive,
                )
                .with_label("Buzzing or hissing sound"),
            ),
            EdgeRecord::evidence(
                EvidenceLink::from_observation(
                    "No Music",
                    "Dead Battery",
                    Confidence::Suggests,
                    Confidence::RulesOut,
                )
                .with_label("No music playing"),
            ),
            EdgeRecord::evidence(
                EvidenceLink::from_observation(
                    "No Music",
                    "Mute Mode",
                    Confidence::Suggests,
                    Confidence::Inconclusive,
                )
                .with_label("No music playing"),
            ),
            EdgeRecord::evidence(
                EvidenceLink::from_observation(
                    "No Music",
                    "Device Off",
                    Confidence::Suggests,
                    Confidence::RulesOut,
                )
                .with_label("No music playing"),
            ),
        ],
    }
}

/// Broken speaker wire scenario built around electrical tests.
///
/// One failure mode with three caused symptoms and two sensors:
/// - speaker_impedance above 1000 ohm confirms the break
/// - speaker_continuity reading 1 (Continuity OK) rules it out, while 0
///   (No Continuity) confirms it
///
/// The continuity edge demonstrates an inverted sensor: its when-true
/// strength is the ruling-out one.
pub fn broken_speaker_wire() -> GraphSnapshot {
    GraphSnapshot {
        nodes: vec![
            FailureMode::new(
                "Broken Speaker Wire",
                "The wire connecting the speaker to the circuit board is broken",
            )
            .into(),
            Observation::new(
                "Intermittent Sound",
                "Sound cuts in and out when the toy is moved",
            )
            .into(),
            Observation::new("Sound Only on One Side", "Sound only comes from one speaker").into(),
            Observation::new("No Music", "No sound is playing from the device").into(),
            SensorReading::new("speaker_impedance", "Measured impedance of the speaker circuit")
                .with_unit("ohm")
                .into(),
            SensorReading::new("speaker_continuity", "Continuity test result for speaker wiring")
                .with_unit("bool")
                .with_value_label("0", "No Continuity")
                .with_value_label("1", "Continuity OK")
                .into(),
        ],
        edges: vec![
            EdgeRecord::causes("Broken Speaker Wire", "Intermittent Sound"),
            EdgeRecord::causes("Broken Speaker Wire", "Sound Only on One Side"),
            EdgeRecord::causes("Broken Speaker Wire", "No Music"),
            EdgeRecord::evidence(
                EvidenceLink::from_sensor(
                    "speaker_impedance",
                    "Broken Speaker Wire",
                    Confidence::Confirms,
                    Confidence::SuggestsAgainst,
                    ComparisonOperator::Gt,
                    Threshold::Value(1000.0),
                )
                .with_label("High speaker impedance")
                .with_when_true_rationale("an open circuit measures near-infinite impedance"),
            ),
            EdgeRecord::evidence(
                EvidenceLink::from_sensor(
                    "speaker_continuity",
                    "Broken Speaker Wire",
                    Confidence::RulesOut,
                    Confidence::Confirms,
                    ComparisonOperator::Eq,
                    Threshold::Value(1.0),
                )
                .with_label("Speaker wire continuity test")
                .with_when_false_rationale("no continuity means the wire is physically severed"),
            ),
            EdgeRecord::evidence(
                EvidenceLink::from_observation(
                    "Intermittent Sound",
                    "Broken Speaker Wire",
                    Confidence::Suggests,
                    Confidence::Inconclusive,
                )
                .with_label("Sound cuts in and out"),
            ),
            EdgeRecord::evidence(
                EvidenceLink::from_observation(
                    "Sound Only on One Side",
                    "Broken Speaker Wire",
                    Confidence::Suggests,
                    Confidence::Inconclusive,
                )
                .with_label("Sound only from one speaker"),
            ),
            EdgeRecord::evidence(
                EvidenceLink::from_observation(
                    "No Music",
                    "Broken Speaker Wire",
                    Confidence::Suggests,
                    Confidence::RulesOut,
                )
                .with_label("No music playing"),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DiagnosticGraph;

    #[test]
    fn test_basic_device_validates() {
        let graph = DiagnosticGraph::from_snapshot(basic_device()).unwrap();
        assert_eq!(graph.failure_modes().len(), 4);
        assert_eq!(graph.observations().len(), 2);
        assert_eq!(graph.sensors().len(), 2);
        assert_eq!(graph.causes().len(), 5);
        assert_eq!(graph.evidence().len(), 7);
    }

    #[test]
    fn test_basic_device_switch_labels() {
        let graph = DiagnosticGraph::from_snapshot(basic_device()).unwrap();
        let switch = graph.sensor("switch_status").unwrap();
        assert_eq!(switch.unit.as_deref(), Some("enum"));
        assert_eq!(switch.label_for(2.0), Some("MUTE"));
        assert_eq!(switch.label_for(3.0), None);
    }

    #[test]
    fn test_basic_device_every_mode_causes_no_music() {
        let graph = DiagnosticGraph::from_snapshot(basic_device()).unwrap();
        let causers: Vec<&str> = graph
            .causes_of("No Music")
            .map(|link| link.failure_mode.as_str())
            .collect();
        assert_eq!(
            causers,
            ["Dead Battery", "Mute Mode", "Speaker Broken", "Device Off"]
        );
    }

    #[test]
    fn test_broken_speaker_wire_validates() {
        let graph = DiagnosticGraph::from_snapshot(broken_speaker_wire()).unwrap();
        assert_eq!(graph.failure_modes().len(), 1);
        assert_eq!(graph.observations().len(), 3);
        assert_eq!(graph.sensors().len(), 2);
        assert_eq!(graph.causes().len(), 3);
        assert_eq!(graph.evidence().len(), 5);
    }

    #[test]
    fn test_broken_speaker_wire_inverted_continuity_edge() {
        let graph = DiagnosticGraph::from_snapshot(broken_speaker_wire()).unwrap();
        let continuity = graph
            .evidence()
            .iter()
            .find(|link| link.source.name() == "speaker_continuity")
            .unwrap();
        assert_eq!(continuity.when_true, Confidence::RulesOut);
        assert_eq!(continuity.when_false, Confidence::Confirms);
    }
}
