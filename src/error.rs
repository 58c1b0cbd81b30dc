//! Error types for scenario configuration and simulation runs.

use thiserror::Error;

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"tank.storage_volume_gal"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors that abort a simulation run.
///
/// A failed run yields no series, only the error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Inputs are inconsistent or invalid; raised before the first step.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The swing tank dropped below the supply temperature.
    #[error(
        "step {step}: swing tank fell to {temperature_f:.2} F, below the {supply_f:.2} F \
         supply temperature; the swing tank is undersized"
    )]
    SwingTankUndersized {
        step: usize,
        temperature_f: f64,
        supply_f: f64,
    },

    /// The primary storage volume went negative.
    #[error("step {step}: primary storage ran out of volume ({volume_gal:.2} gal)")]
    PrimaryDepleted { step: usize, volume_gal: f64 },

    /// Export or file access failure.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Io(e.to_string())
    }
}

impl From<csv::Error> for SimError {
    fn from(e: csv::Error) -> Self {
        SimError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_names_field() {
        let e = ConfigError::new("tank.storage_volume_gal", "must be > 0");
        assert_eq!(
            e.to_string(),
            "config error: tank.storage_volume_gal: must be > 0"
        );
    }

    #[test]
    fn config_error_converts_into_sim_error() {
        let e: SimError = ConfigError::new("schematic", "unknown").into();
        assert!(matches!(e, SimError::Config(_)));
        assert!(e.to_string().contains("schematic"));
    }

    #[test]
    fn swing_error_reports_step() {
        let e = SimError::SwingTankUndersized {
            step: 42,
            temperature_f: 119.5,
            supply_f: 120.0,
        };
        assert!(e.to_string().starts_with("step 42:"));
    }
}
