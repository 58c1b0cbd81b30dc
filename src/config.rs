//! TOML-based scenario configuration and preset definitions.
//!
//! A scenario describes one day of hourly demand and load-shift controls; it
//! is expanded into the per-minute sequences the simulator consumes.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, SimResult};
use crate::sim::engine::Simulator;
use crate::sim::schedule::{ControlMode, LoadShiftSchedule};
use crate::sim::types::{Schematic, SimConfig, SimulationOutput, SwingTankConfig, Temperatures};
use crate::sim::units::{HOURS_PER_DAY, MINUTES_PER_HOUR, hourly_to_minutely, kbtuhr_to_gph};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the swing tank scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use a preset.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Schematic, horizon, and initial state overrides.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Primary storage and aquastat placement.
    #[serde(default)]
    pub tank: TankConfig,
    #[serde(default)]
    pub temperatures: TemperatureConfig,
    /// Primary heating capacity.
    #[serde(default)]
    pub heating: HeatingConfig,
    /// Hourly hot water demand.
    #[serde(default)]
    pub demand: DemandConfig,
    /// Hourly load-shift controls.
    #[serde(default)]
    pub load_shift: LoadShiftConfig,
    /// Swing tank parameters (swingtank schematic only).
    #[serde(default)]
    pub swing_tank: SwingTankSection,
    /// Sizing sweep grid.
    #[serde(default)]
    pub sweep: SweepConfig,
}

/// Schematic, horizon, and initial state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// `"primary"`, `"paralleltank"`, or `"swingtank"`.
    pub schematic: String,
    /// Days simulated; the hourly profiles repeat each day.
    pub days: usize,
    /// Starting primary volume (gal). Defaults to full storage.
    pub initial_volume_gal: Option<f64>,
    /// Starting swing tank temperature (°F). Defaults to storage temperature.
    pub initial_swing_temp_f: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            schematic: "swingtank".to_string(),
            days: 1,
            initial_volume_gal: None,
            initial_swing_temp_f: None,
        }
    }
}

/// Primary storage volume and aquastat fractions per control mode.
///
/// The aquastat fraction is the share of storage below the aquastat:
/// heating triggers at `storage_volume_gal * (1 - fraction)`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TankConfig {
    /// Storage volume at storage temperature (gal).
    pub storage_volume_gal: f64,
    pub aquastat_fraction_normal: f64,
    pub aquastat_fraction_load_up: f64,
    pub aquastat_fraction_shed: f64,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            storage_volume_gal: 300.0,
            aquastat_fraction_normal: 0.4,
            aquastat_fraction_load_up: 0.2,
            aquastat_fraction_shed: 0.8,
        }
    }
}

impl TankConfig {
    fn aquastat_fraction(&self, mode: ControlMode) -> f64 {
        match mode {
            ControlMode::Normal => self.aquastat_fraction_normal,
            ControlMode::LoadUp => self.aquastat_fraction_load_up,
            ControlMode::Shed => self.aquastat_fraction_shed,
        }
    }
}

/// Plant temperatures (°F).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemperatureConfig {
    pub cold_f: f64,
    pub storage_f: f64,
    pub supply_f: f64,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            cold_f: 50.0,
            storage_f: 150.0,
            supply_f: 120.0,
        }
    }
}

/// Primary heating capacity.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeatingConfig {
    /// Output in normal and shed hours (kBTU/hr).
    pub capacity_kbtuhr: f64,
    /// Output in load-up hours (kBTU/hr). Defaults to `capacity_kbtuhr`.
    pub load_up_capacity_kbtuhr: Option<f64>,
    /// Output derating for defrost cycles (0.0–1.0).
    pub defrost_factor: f64,
    /// Zero the generation rate during shed hours.
    pub block_generation_during_shed: bool,
}

impl Default for HeatingConfig {
    fn default() -> Self {
        Self {
            capacity_kbtuhr: 140.0,
            load_up_capacity_kbtuhr: None,
            defrost_factor: 1.0,
            block_generation_during_shed: false,
        }
    }
}

impl HeatingConfig {
    fn capacity(&self, mode: ControlMode) -> f64 {
        match mode {
            ControlMode::LoadUp => self.load_up_capacity_kbtuhr.unwrap_or(self.capacity_kbtuhr),
            ControlMode::Normal | ControlMode::Shed => self.capacity_kbtuhr,
        }
    }
}

/// Hourly hot water demand.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandConfig {
    /// Draw per hour of the day at supply temperature (gal/hr, 24 entries).
    pub hourly_gph: Vec<f64>,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            hourly_gph: vec![
                27.0, 12.0, 8.0, 8.0, 24.0, 40.0, 74.0, 87.0, 82.0, 67.0, 40.0, 34.0, 29.0, 27.0,
                29.0, 34.0, 40.0, 48.0, 51.0, 55.0, 59.0, 51.0, 38.0, 36.0,
            ],
        }
    }
}

/// Hourly load-shift controls.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadShiftConfig {
    /// Control per hour of the day (24 entries, `"N"`, `"L"`, or `"S"`).
    pub controls: Vec<ControlMode>,
}

impl Default for LoadShiftConfig {
    fn default() -> Self {
        Self {
            controls: vec![ControlMode::Normal; HOURS_PER_DAY],
        }
    }
}

/// Swing tank parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwingTankSection {
    pub volume_gal: f64,
    /// Element turn-on temperature (°F).
    pub trigger_temp_f: f64,
    /// Recirculation loop losses (W).
    pub recirc_loss_w: f64,
    /// Element output (kW).
    pub element_kw: f64,
}

impl Default for SwingTankSection {
    fn default() -> Self {
        Self {
            volume_gal: 80.0,
            trigger_temp_f: 121.0,
            recirc_loss_w: 2700.0,
            element_kw: 5.0,
        }
    }
}

/// Storage volume by capacity sizing grid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub storage_volumes_gal: Vec<f64>,
    pub capacities_kbtuhr: Vec<f64>,
    /// Load-up capacity as a multiple of the swept capacity.
    pub load_up_capacity_factor: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            storage_volumes_gal: (0..27).map(|i| 200.0 + 30.0 * i as f64).collect(),
            capacities_kbtuhr: (0..26).map(|i| 50.0 + 10.0 * i as f64).collect(),
            load_up_capacity_factor: 1.1,
        }
    }
}

/// Minute-resolution inputs built from a scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub sim_config: SimConfig,
    pub schedule: LoadShiftSchedule,
    pub initial_volume_gal: Option<f64>,
    pub initial_swing_temp_f: Option<f64>,
}

impl Scenario {
    /// Builds a simulator and runs the full horizon.
    ///
    /// # Errors
    ///
    /// Propagates configuration and physical errors from the simulator.
    pub fn run(&self) -> SimResult<SimulationOutput> {
        let sim = Simulator::new(self.sim_config.clone())?;
        sim.simulate(
            &self.schedule,
            self.initial_volume_gal,
            self.initial_swing_temp_f,
        )
    }
}

impl ScenarioConfig {
    /// Returns the swing tank scenario with normal operation all day.
    pub fn swing_tank() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            tank: TankConfig::default(),
            temperatures: TemperatureConfig::default(),
            heating: HeatingConfig::default(),
            demand: DemandConfig::default(),
            load_shift: LoadShiftConfig::default(),
            swing_tank: SwingTankSection::default(),
            sweep: SweepConfig::default(),
        }
    }

    /// Returns the primary-only preset.
    pub fn primary() -> Self {
        Self {
            simulation: SimulationConfig {
                schematic: "primary".to_string(),
                ..SimulationConfig::default()
            },
            ..Self::swing_tank()
        }
    }

    /// Returns the load-shift preset: morning and evening sheds with load-up
    /// ahead of each, on a larger swing tank plant.
    pub fn load_shift() -> Self {
        use ControlMode::{LoadUp as L, Normal as N, Shed as S};
        Self {
            tank: TankConfig {
                storage_volume_gal: 400.0,
                ..TankConfig::default()
            },
            heating: HeatingConfig {
                load_up_capacity_kbtuhr: Some(154.0),
                ..HeatingConfig::default()
            },
            load_shift: LoadShiftConfig {
                controls: vec![
                    N, N, N, N, L, L, S, S, S, S, L, L, L, L, L, L, L, S, S, S, S, N, N, N,
                ],
            },
            ..Self::swing_tank()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["swing_tank", "primary", "load_shift"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "swing_tank" => Ok(Self::swing_tank()),
            "primary" => Ok(Self::primary()),
            "load_shift" => Ok(Self::load_shift()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigError::new(field, message));
            }
        };

        let s = &self.simulation;
        let schematic = s.schematic.parse::<Schematic>();
        check(s.days > 0, "simulation.days", "must be > 0");

        let tank = &self.tank;
        check(tank.storage_volume_gal > 0.0, "tank.storage_volume_gal", "must be > 0");
        for (field, fraction) in [
            ("tank.aquastat_fraction_normal", tank.aquastat_fraction_normal),
            ("tank.aquastat_fraction_load_up", tank.aquastat_fraction_load_up),
            ("tank.aquastat_fraction_shed", tank.aquastat_fraction_shed),
        ] {
            check(fraction > 0.0 && fraction <= 1.0, field, "must be in (0.0, 1.0]");
        }

        let t = &self.temperatures;
        for (field, temp) in [
            ("temperatures.cold_f", t.cold_f),
            ("temperatures.storage_f", t.storage_f),
            ("temperatures.supply_f", t.supply_f),
        ] {
            check(
                (32.0..=212.0).contains(&temp),
                field,
                "must be between 32 and 212 F",
            );
        }
        check(
            t.supply_f <= t.storage_f,
            "temperatures.supply_f",
            "must be <= temperatures.storage_f",
        );
        check(
            t.cold_f < t.supply_f,
            "temperatures.cold_f",
            "must be < temperatures.supply_f",
        );

        let h = &self.heating;
        check(h.capacity_kbtuhr >= 0.0, "heating.capacity_kbtuhr", "must be >= 0");
        check(
            h.load_up_capacity_kbtuhr.is_none_or(|c| c >= 0.0),
            "heating.load_up_capacity_kbtuhr",
            "must be >= 0",
        );
        check(
            (0.0..=1.0).contains(&h.defrost_factor),
            "heating.defrost_factor",
            "must be in [0.0, 1.0]",
        );

        check(
            self.demand.hourly_gph.len() == HOURS_PER_DAY,
            "demand.hourly_gph",
            "must have 24 entries",
        );
        check(
            self.demand.hourly_gph.iter().all(|&d| d >= 0.0),
            "demand.hourly_gph",
            "entries must be >= 0",
        );
        check(
            self.load_shift.controls.len() == HOURS_PER_DAY,
            "load_shift.controls",
            "must have 24 entries",
        );

        if schematic == Ok(Schematic::SwingTank) {
            let sw = &self.swing_tank;
            check(sw.volume_gal > 0.0, "swing_tank.volume_gal", "must be > 0");
            check(sw.element_kw > 0.0, "swing_tank.element_kw", "must be > 0");
            check(sw.recirc_loss_w >= 0.0, "swing_tank.recirc_loss_w", "must be >= 0");
            check(
                sw.trigger_temp_f >= t.supply_f,
                "swing_tank.trigger_temp_f",
                "must be >= temperatures.supply_f",
            );
        }

        let sw = &self.sweep;
        check(
            sw.load_up_capacity_factor > 0.0,
            "sweep.load_up_capacity_factor",
            "must be > 0",
        );

        if let Err(e) = schematic {
            errors.push(e);
        }
        errors
    }

    /// Expands the hourly scenario into per-minute simulator inputs.
    ///
    /// # Errors
    ///
    /// Returns the first validation error, if any.
    pub fn build(&self) -> Result<Scenario, ConfigError> {
        if let Some(e) = self.validate().into_iter().next() {
            return Err(e);
        }
        let schematic: Schematic = self.simulation.schematic.parse()?;
        let t = &self.temperatures;
        let days = self.simulation.days;

        let modes: Vec<ControlMode> = self.load_shift.controls.repeat(days);
        let draw_gph: Vec<f64> = self.demand.hourly_gph.repeat(days);

        let rise_f = t.supply_f - t.cold_f;
        let generation_gph: Vec<f64> = modes
            .iter()
            .map(|&mode| {
                if mode == ControlMode::Shed && self.heating.block_generation_during_shed {
                    0.0
                } else {
                    kbtuhr_to_gph(self.heating.capacity(mode), rise_f) * self.heating.defrost_factor
                }
            })
            .collect();
        let trigger_gal: Vec<f64> = modes
            .iter()
            .map(|&mode| self.tank.storage_volume_gal * (1.0 - self.tank.aquastat_fraction(mode)))
            .collect();

        let per_minute = |hourly: &[f64]| -> Vec<f64> {
            hourly_to_minutely(hourly)
                .into_iter()
                .map(|v| v / MINUTES_PER_HOUR as f64)
                .collect()
        };

        let swing_tank = (schematic == Schematic::SwingTank).then(|| SwingTankConfig {
            volume_gal: self.swing_tank.volume_gal,
            trigger_temp_f: self.swing_tank.trigger_temp_f,
            recirc_loss_w: self.swing_tank.recirc_loss_w,
            element_kw: self.swing_tank.element_kw,
        });

        Ok(Scenario {
            sim_config: SimConfig {
                generation_gpm: per_minute(&generation_gph),
                draw_gpm: per_minute(&draw_gph),
                trigger_volume_gal: hourly_to_minutely(&trigger_gal),
                storage_volume_gal: self.tank.storage_volume_gal,
                temperatures: Temperatures {
                    cold_f: t.cold_f,
                    storage_f: t.storage_f,
                    supply_f: t.supply_f,
                },
                schematic,
                swing_tank,
            },
            schedule: LoadShiftSchedule::from_modes(&hourly_to_minutely(&modes)),
            initial_volume_gal: self.simulation.initial_volume_gal,
            initial_swing_temp_f: self.simulation.initial_swing_temp_f,
        })
    }

    /// Copy of this scenario resized to a storage volume and capacity.
    pub fn resized(&self, storage_volume_gal: f64, capacity_kbtuhr: f64) -> Self {
        let mut cfg = self.clone();
        cfg.tank.storage_volume_gal = storage_volume_gal;
        cfg.heating.capacity_kbtuhr = capacity_kbtuhr;
        cfg.heating.load_up_capacity_kbtuhr =
            Some(capacity_kbtuhr * self.sweep.load_up_capacity_factor);
        cfg.simulation.initial_volume_gal = None;
        cfg
    }
}
