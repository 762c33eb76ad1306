use std::env;

use crate::error::DiagnosticError;

/// Default offset used to probe sensor values around a threshold
pub const DEFAULT_PROBE_DELTA: f64 = 0.1;

/// Library configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Diagnosis engine settings
    pub engine: EngineConfig,
    /// Truth table settings
    pub truth_table: TruthTableConfig,
}

/// Diagnosis engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Attach a rendered explanation to every diagnosis result
    pub include_explanations: bool,
}

/// Truth table configuration
#[derive(Debug, Clone)]
pub struct TruthTableConfig {
    /// Offset applied below and above each known threshold when generating
    /// sensor probe values
    pub probe_delta: f64,
    /// Evaluate generated cases on the rayon thread pool
    pub parallel: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, DiagnosticError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let engine = EngineConfig {
            include_explanations: env_flag("ENGINE_INCLUDE_EXPLANATIONS", false),
        };

        let probe_delta = match env::var("TRUTH_TABLE_PROBE_DELTA") {
            Ok(raw) => raw.parse::<f64>().map_err(|_| DiagnosticError::Config {
                message: format!("TRUTH_TABLE_PROBE_DELTA is not a number: {raw}"),
            })?,
            Err(_) => DEFAULT_PROBE_DELTA,
        };
        if !probe_delta.is_finite() || probe_delta <= 0.0 {
            return Err(DiagnosticError::Config {
                message: format!("TRUTH_TABLE_PROBE_DELTA must be a positive number, got {probe_delta}"),
            });
        }

        let truth_table = TruthTableConfig {
            probe_delta,
            parallel: env_flag("TRUTH_TABLE_PARALLEL", false),
        };

        Ok(Config {
            engine,
            truth_table,
        })
    }
}

impl Default for TruthTableConfig {
    fn default() -> Self {
        Self {
            probe_delta: DEFAULT_PROBE_DELTA,
            parallel: false,
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.engine.include_explanations);
        assert_eq!(config.truth_table.probe_delta, DEFAULT_PROBE_DELTA);
        assert!(!config.truth_table.parallel);
    }

    #[test]
    fn test_env_flag_parsing() {
        assert!(!env_flag("DIAGNOSTIC_FLAG_THAT_IS_NEVER_SET", false));
        assert!(env_flag("DIAGNOSTIC_FLAG_THAT_IS_NEVER_SET", true));
    }

    #[test]
    fn test_from_env_succeeds() {
        let config = Config::from_env().unwrap();
        assert!(config.truth_table.probe_delta > 0.0);
    }
}
