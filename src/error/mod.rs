use thiserror::Error;

/// Top-level errors for diagnostic operations
#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
}

/// Graph construction errors
///
/// Raised while validating a snapshot, before any engine runs. Construction
/// fails fast on the first violation so bad exports are caught immediately.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Duplicate {kind} node: {name}")]
    DuplicateNode { kind: String, name: String },

    #[error("Unknown {kind} node '{name}' referenced by {edge}")]
    UnknownNode {
        kind: String,
        name: String,
        edge: String,
    },

    #[error("Invalid endpoint in {edge}: {reason}")]
    InvalidEndpoint { edge: String, reason: String },

    #[error("Sensor evidence '{sensor}' for failure mode '{failure_mode}' is missing operator or threshold")]
    MissingSensorCondition {
        sensor: String,
        failure_mode: String,
    },

    #[error("Snapshot parse error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Condition evaluation errors
///
/// An operator paired with a threshold shape it cannot compare is reported
/// the first time the condition is evaluated, never treated as false.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Unsupported condition on sensor '{sensor}' (evidence for '{failure_mode}'): operator '{operator}' cannot evaluate {threshold_kind} threshold")]
    UnsupportedCondition {
        sensor: String,
        failure_mode: String,
        operator: String,
        threshold_kind: String,
    },
}

/// Result type alias for diagnostic operations
pub type DiagnosticResult<T> = Result<T, DiagnosticError>;

/// Result type alias for graph construction
pub type GraphResult<T> = Result<T, GraphError>;

/// Result type alias for condition evaluation
pub type EvaluationResult<T> = Result<T, EvaluationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_error_display() {
        let err = DiagnosticError::Config {
            message: "bad probe delta".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: bad probe delta");
    }

    #[test]
    fn test_graph_error_display() {
        let err = GraphError::DuplicateNode {
            kind: "failure_mode".to_string(),
            name: "Dead Battery".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate failure_mode node: Dead Battery");

        let err = GraphError::UnknownNode {
            kind: "observation".to_string(),
            name: "No Music".to_string(),
            edge: "causes edge 'Dead Battery' -> 'No Music'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown observation node 'No Music' referenced by causes edge 'Dead Battery' -> 'No Music'"
        );

        let err = GraphError::InvalidEndpoint {
            edge: "causes edge 'Dead Battery' -> 'battery_voltage'".to_string(),
            reason: "target must be an observation".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid endpoint in causes edge 'Dead Battery' -> 'battery_voltage': target must be an observation"
        );

        let err = GraphError::MissingSensorCondition {
            sensor: "battery_voltage".to_string(),
            failure_mode: "Dead Battery".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Sensor evidence 'battery_voltage' for failure mode 'Dead Battery' is missing operator or threshold"
        );
    }

    #[test]
    fn test_evaluation_error_display() {
        let err = EvaluationError::UnsupportedCondition {
            sensor: "switch_status".to_string(),
            failure_mode: "Mute Mode".to_string(),
            operator: "in".to_string(),
            threshold_kind: "scalar".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported condition on sensor 'switch_status' (evidence for 'Mute Mode'): operator 'in' cannot evaluate scalar threshold"
        );
    }

    #[test]
    fn test_graph_error_conversion_to_diagnostic_error() {
        let graph_err = GraphError::DuplicateNode {
            kind: "sensor_reading".to_string(),
            name: "battery_voltage".to_string(),
        };
        let err: DiagnosticError = graph_err.into();
        assert!(matches!(err, DiagnosticError::Graph(_)));
        assert!(err.to_string().contains("Duplicate sensor_reading node"));
    }

    #[test]
    fn test_evaluation_error_conversion_to_diagnostic_error() {
        let eval_err = EvaluationError::UnsupportedCondition {
            sensor: "speaker_impedance".to_string(),
            failure_mode: "Speaker Broken".to_string(),
            operator: ">".to_string(),
            threshold_kind: "list".to_string(),
        };
        let err: DiagnosticError = eval_err.into();
        assert!(matches!(err, DiagnosticError::Evaluation(_)));
        assert!(err.to_string().contains("Unsupported condition"));
    }
}
