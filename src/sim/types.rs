//! Core simulation types: configuration, tank states, and output series.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::schedule::LoadShift;
use super::units::{MINUTES_PER_HOUR, watts_to_degf_per_minute};
use crate::error::ConfigError;

/// Plant layout selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Schematic {
    /// Primary storage only.
    Primary,
    /// Primary storage with a separate temperature-maintenance tank on the loop.
    #[serde(rename = "paralleltank")]
    ParallelTank,
    /// Primary storage feeding a swing tank in series.
    #[serde(rename = "swingtank")]
    SwingTank,
}

impl Schematic {
    pub const NAMES: &[&str] = &["primary", "paralleltank", "swingtank"];

    pub fn as_str(self) -> &'static str {
        match self {
            Schematic::Primary => "primary",
            Schematic::ParallelTank => "paralleltank",
            Schematic::SwingTank => "swingtank",
        }
    }
}

impl FromStr for Schematic {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Schematic::Primary),
            "paralleltank" => Ok(Schematic::ParallelTank),
            "swingtank" => Ok(Schematic::SwingTank),
            other => Err(ConfigError::new(
                "simulation.schematic",
                format!(
                    "\"{other}\" is not a valid schematic, expected one of: {}",
                    Self::NAMES.join(", ")
                ),
            )),
        }
    }
}

impl fmt::Display for Schematic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plant water temperatures (°F).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperatures {
    /// Cold makeup water.
    pub cold_f: f64,
    /// Primary storage.
    pub storage_f: f64,
    /// Delivered to occupants.
    pub supply_f: f64,
}

/// Swing tank sizing and loop parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingTankConfig {
    /// Swing tank volume (gal).
    pub volume_gal: f64,
    /// Temperature at which the resistance element turns on (°F).
    pub trigger_temp_f: f64,
    /// Recirculation loop heat loss (W).
    pub recirc_loss_w: f64,
    /// Resistance element output (kW).
    pub element_kw: f64,
}

impl SwingTankConfig {
    /// Tank temperature drop per minute from loop losses.
    pub fn recirc_loss_per_minute(&self) -> f64 {
        watts_to_degf_per_minute(self.recirc_loss_w, self.volume_gal)
    }

    /// Tank temperature rise per minute with the element on.
    pub fn element_heat_per_minute(&self) -> f64 {
        watts_to_degf_per_minute(self.element_kw * 1000.0, self.volume_gal)
    }
}

/// Immutable inputs for one simulation run. All sequences are per minute.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Hot water generation rate (gal/min).
    pub generation_gpm: Vec<f64>,
    /// Hot water draw rate at supply temperature (gal/min).
    pub draw_gpm: Vec<f64>,
    /// Storage volume at which heating is triggered (gal).
    pub trigger_volume_gal: Vec<f64>,
    /// Primary storage capacity at storage temperature, V0 (gal).
    pub storage_volume_gal: f64,
    pub temperatures: Temperatures,
    pub schematic: Schematic,
    /// Required for [`Schematic::SwingTank`], ignored otherwise.
    pub swing_tank: Option<SwingTankConfig>,
}

impl SimConfig {
    /// Number of minutes simulated.
    pub fn len(&self) -> usize {
        self.generation_gpm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generation_gpm.is_empty()
    }

    /// Checks every run-independent constraint, returning the first violation.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the offending input.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = self.generation_gpm.len();
        if n == 0 {
            return Err(ConfigError::new("generation_gpm", "must not be empty"));
        }
        if self.draw_gpm.len() != n {
            return Err(ConfigError::new(
                "draw_gpm",
                format!(
                    "length {} does not match generation length {n}",
                    self.draw_gpm.len()
                ),
            ));
        }
        if self.trigger_volume_gal.len() != n {
            return Err(ConfigError::new(
                "trigger_volume_gal",
                format!(
                    "length {} does not match generation length {n}",
                    self.trigger_volume_gal.len()
                ),
            ));
        }
        if !(self.storage_volume_gal.is_finite() && self.storage_volume_gal > 0.0) {
            return Err(ConfigError::new("storage_volume_gal", "must be finite and > 0"));
        }
        if !(self.storage_volume_gal > self.trigger_volume_gal[0]) {
            return Err(ConfigError::new(
                "storage_volume_gal",
                "initial storage volume must exceed the first trigger volume",
            ));
        }
        if let Some(t) = self
            .trigger_volume_gal
            .iter()
            .position(|&v| !(v >= 0.0 && v < self.storage_volume_gal))
        {
            return Err(ConfigError::new(
                "trigger_volume_gal",
                format!("entry {t} must lie in [0, storage volume)"),
            ));
        }
        if let Some(t) = self.generation_gpm.iter().position(|&g| !is_rate(g)) {
            return Err(ConfigError::new(
                "generation_gpm",
                format!("entry {t} must be finite and >= 0"),
            ));
        }
        if let Some(t) = self.draw_gpm.iter().position(|&d| !is_rate(d)) {
            return Err(ConfigError::new(
                "draw_gpm",
                format!("entry {t} must be finite and >= 0"),
            ));
        }

        let temps = &self.temperatures;
        for (field, temp) in [
            ("temperatures.cold_f", temps.cold_f),
            ("temperatures.storage_f", temps.storage_f),
            ("temperatures.supply_f", temps.supply_f),
        ] {
            if !temp.is_finite() {
                return Err(ConfigError::new(field, "must be finite"));
            }
        }
        if temps.storage_f == temps.cold_f {
            return Err(ConfigError::new(
                "temperatures.storage_f",
                "must differ from temperatures.cold_f",
            ));
        }

        if self.schematic == Schematic::SwingTank {
            let Some(swing) = &self.swing_tank else {
                return Err(ConfigError::new(
                    "swing_tank",
                    "required for the swingtank schematic",
                ));
            };
            if !(swing.volume_gal.is_finite() && swing.volume_gal > 0.0) {
                return Err(ConfigError::new("swing_tank.volume_gal", "must be > 0"));
            }
            if !(swing.element_kw.is_finite() && swing.element_kw > 0.0) {
                return Err(ConfigError::new("swing_tank.element_kw", "must be > 0"));
            }
            if !is_rate(swing.recirc_loss_w) {
                return Err(ConfigError::new("swing_tank.recirc_loss_w", "must be >= 0"));
            }
            if !swing.trigger_temp_f.is_finite() {
                return Err(ConfigError::new("swing_tank.trigger_temp_f", "must be finite"));
            }
            if temps.supply_f <= temps.cold_f {
                return Err(ConfigError::new(
                    "temperatures.supply_f",
                    "must be above temperatures.cold_f",
                ));
            }
        }
        Ok(())
    }
}

/// Finite and non-negative.
fn is_rate(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

/// Carried primary tank state between minutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimaryState {
    /// Hot water above the cold boundary, at storage temperature (gal).
    pub volume_gal: f64,
    /// Whether the heat pumps are running.
    pub heating: bool,
}

/// Carried swing tank state between minutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingState {
    /// Well-mixed tank temperature (°F).
    pub temperature_f: f64,
    /// Whether the resistance element is on.
    pub element_on: bool,
}

/// Swing tank time series.
#[derive(Debug, Clone, PartialEq)]
pub struct SwingSeries {
    /// Tank temperature per minute (°F).
    pub temperature_f: Vec<f64>,
    /// Fraction of each minute the element ran.
    pub element_run: Vec<f64>,
    /// Draw delivered to the primary system per minute, mixed at swing temperature (gal).
    pub effective_draw_gal: Vec<f64>,
}

/// Complete series from one run. Index 0 holds the initial state.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutput {
    pub schematic: Schematic,
    /// Primary storage volume per minute (gal).
    pub volume_gal: Vec<f64>,
    /// Generation rate input (gal/min).
    pub generation_gpm: Vec<f64>,
    /// Draw rate input (gal/min).
    pub draw_gpm: Vec<f64>,
    /// Volume actually generated each minute (gal).
    pub generated_gal: Vec<f64>,
    /// Heating flag at the end of each minute.
    pub heating: Vec<bool>,
    pub load_shift: Vec<LoadShift>,
    /// Shed commanded while heating remained active.
    pub shed_violation: Vec<bool>,
    pub swing: Option<SwingSeries>,
    pub total_shed_violation_minutes: usize,
}

impl SimulationOutput {
    pub fn len(&self) -> usize {
        self.volume_gal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volume_gal.is_empty()
    }

    /// Flattens the series into one record per minute.
    pub fn records(&self) -> Vec<StepRecord> {
        (0..self.len())
            .map(|t| StepRecord {
                timestep: t,
                time_hr: t as f64 / MINUTES_PER_HOUR as f64,
                draw_gpm: self.draw_gpm[t],
                generation_gpm: self.generation_gpm[t],
                volume_gal: self.volume_gal[t],
                generated_gal: self.generated_gal[t],
                heating: self.heating[t],
                shed: self.load_shift[t].is_shed(),
                shed_violation: self.shed_violation[t],
                swing_temp_f: self.swing.as_ref().map(|s| s.temperature_f[t]),
                swing_element_run: self.swing.as_ref().map(|s| s.element_run[t]),
                effective_swing_draw_gal: self.swing.as_ref().map(|s| s.effective_draw_gal[t]),
            })
            .collect()
    }
}

/// One minute of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub timestep: usize,
    pub time_hr: f64,
    pub draw_gpm: f64,
    pub generation_gpm: f64,
    pub volume_gal: f64,
    pub generated_gal: f64,
    pub heating: bool,
    pub shed: bool,
    pub shed_violation: bool,
    pub swing_temp_f: Option<f64>,
    pub swing_element_run: Option<f64>,
    pub effective_swing_draw_gal: Option<f64>,
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>5} ({:>6.2}h) | V={:>8.2} gal  gen={:>6.3} gal  draw={:>6.3} gpm \
             heating={} shed={} violation={}",
            self.timestep,
            self.time_hr,
            self.volume_gal,
            self.generated_gal,
            self.draw_gpm,
            self.heating,
            self.shed,
            self.shed_violation,
        )?;
        if let (Some(temp), Some(run)) = (self.swing_temp_f, self.swing_element_run) {
            write!(f, " | swing={temp:>6.2} F  element={run:.3}")?;
        }
        Ok(())
    }
}
