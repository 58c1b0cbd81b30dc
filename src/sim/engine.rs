//! Time-step driver that advances the primary and swing tanks in lockstep.

use tracing::{debug, info, warn};

use super::primary::{PrimaryInput, PrimaryTank};
use super::schedule::LoadShiftSchedule;
use super::swing::SwingTank;
use super::types::{
    PrimaryState, Schematic, SimConfig, SimulationOutput, SwingSeries, SwingState,
};
use super::units::mix_volume;
use crate::error::{ConfigError, SimResult};

/// Minute-resolution hot water plant simulator.
///
/// Owns its configuration; every call to [`Simulator::simulate`] allocates
/// fresh series, so runs are independent and deterministic.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimConfig,
    primary: PrimaryTank,
    swing: Option<SwingTank>,
}

impl Simulator {
    /// Validates the configuration and builds the tank controllers.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for mismatched sequence lengths, an
    /// initial volume at or below the first trigger volume, or missing swing
    /// tank parameters.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let primary = PrimaryTank::new(config.storage_volume_gal);
        let swing = match (config.schematic, &config.swing_tank) {
            (Schematic::SwingTank, Some(swing)) => {
                Some(SwingTank::new(swing, &config.temperatures))
            }
            _ => None,
        };
        Ok(Self {
            config,
            primary,
            swing,
        })
    }

    /// Runs the full horizon.
    ///
    /// # Arguments
    ///
    /// * `schedule` - Per-minute load-shift flags, same length as the config
    /// * `initial_volume_gal` - Starting primary volume (defaults to capacity)
    /// * `initial_swing_temp_f` - Starting swing temperature (defaults to storage)
    ///
    /// # Errors
    ///
    /// Configuration errors for a bad schedule or initial state; physical
    /// errors when the primary tank empties or the swing tank drops below
    /// supply temperature. No partial series are returned.
    pub fn simulate(
        &self,
        schedule: &LoadShiftSchedule,
        initial_volume_gal: Option<f64>,
        initial_swing_temp_f: Option<f64>,
    ) -> SimResult<SimulationOutput> {
        let cfg = &self.config;
        let n = cfg.len();
        if schedule.len() != n {
            return Err(ConfigError::new(
                "load_shift",
                format!("schedule length {} does not match horizon {n}", schedule.len()),
            )
            .into());
        }

        let capacity = self.primary.capacity_gal();
        let v_init = initial_volume_gal.unwrap_or(capacity);
        if !(v_init > cfg.trigger_volume_gal[0] && v_init <= capacity) {
            return Err(ConfigError::new(
                "initial_volume_gal",
                format!(
                    "{v_init} gal must exceed the first trigger volume {} and not exceed capacity {capacity}",
                    cfg.trigger_volume_gal[0]
                ),
            )
            .into());
        }

        let temps = cfg.temperatures;
        let mut volume_gal = vec![0.0; n];
        let mut generated_gal = vec![0.0; n];
        let mut heating = vec![false; n];
        let mut shed_violation = vec![false; n];
        volume_gal[0] = v_init;

        let mut swing_series = match self.swing {
            Some(_) => Some(self.initial_swing_series(initial_swing_temp_f)?),
            None => None,
        };

        let mut primary_state = PrimaryState {
            volume_gal: v_init,
            heating: false,
        };
        let mut swing_state = SwingState {
            temperature_f: swing_series
                .as_ref()
                .map_or(temps.storage_f, |s| s.temperature_f[0]),
            element_on: false,
        };
        let mut total_shed_violation_minutes = 0;

        for t in 1..n {
            let generation_gal =
                mix_volume(cfg.generation_gpm[t], temps.storage_f, temps.cold_f, temps.supply_f)?;

            let draw_gal = match (&self.swing, swing_series.as_mut()) {
                (Some(swing), Some(series)) => {
                    let effective = mix_volume(
                        cfg.draw_gpm[t],
                        swing_state.temperature_f,
                        temps.cold_f,
                        temps.supply_f,
                    )?;
                    let step = swing.step(t, swing_state, effective)?;
                    swing_state = step.state;
                    series.temperature_f[t] = step.state.temperature_f;
                    series.element_run[t] = step.element_run;
                    series.effective_draw_gal[t] = effective;
                    effective
                }
                _ => mix_volume(cfg.draw_gpm[t], temps.storage_f, temps.cold_f, temps.supply_f)?,
            };

            if schedule.transitioned_to_shed(t) {
                debug!(t, volume = primary_state.volume_gal, "shed period started");
            }
            let was_heating = primary_state.heating;
            let step = self.primary.step(
                t,
                primary_state,
                PrimaryInput {
                    draw_gal,
                    generation_gal,
                    trigger_gal: cfg.trigger_volume_gal[t],
                    shift_now: schedule.at(t),
                    shift_prev: schedule.at(t - 1),
                },
            )?;
            primary_state = step.state;

            if step.shed_violation {
                total_shed_violation_minutes += 1;
                if !shed_violation[t - 1] {
                    debug!(t, volume = step.state.volume_gal, "heating during shed");
                }
            }
            if was_heating != step.state.heating {
                debug!(t, heating = step.state.heating, "primary heating toggled");
            }

            volume_gal[t] = step.state.volume_gal;
            generated_gal[t] = step.generated_gal;
            heating[t] = step.state.heating;
            shed_violation[t] = step.shed_violation;
        }

        if total_shed_violation_minutes > 0 {
            warn!(
                total_shed_violation_minutes,
                shed_minutes = schedule.shed_minutes(),
                "heating ran during shed"
            );
        }
        info!(
            schematic = %cfg.schematic,
            minutes = n,
            total_shed_violation_minutes,
            "simulation complete"
        );

        Ok(SimulationOutput {
            schematic: cfg.schematic,
            volume_gal,
            generation_gpm: cfg.generation_gpm.clone(),
            draw_gpm: cfg.draw_gpm.clone(),
            generated_gal,
            heating,
            load_shift: schedule.iter().collect(),
            shed_violation,
            swing: swing_series,
            total_shed_violation_minutes,
        })
    }

    /// Runs only the swing tank against the raw draw profile.
    ///
    /// Used to estimate the effective demand the swing tank passes on to the
    /// primary system.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless the schematic is `swingtank`, and
    /// [`crate::error::SimError::SwingTankUndersized`] if the tank cannot hold
    /// supply temperature.
    pub fn simulate_swing_only(&self, initial_swing_temp_f: Option<f64>) -> SimResult<SwingSeries> {
        let Some(swing) = &self.swing else {
            return Err(ConfigError::new(
                "simulation.schematic",
                format!(
                    "swing-only run requires the swingtank schematic, got {}",
                    self.config.schematic
                ),
            )
            .into());
        };

        let cfg = &self.config;
        let temps = cfg.temperatures;
        let mut series = self.initial_swing_series(initial_swing_temp_f)?;
        let mut state = SwingState {
            temperature_f: series.temperature_f[0],
            element_on: false,
        };

        for t in 1..cfg.len() {
            let effective =
                mix_volume(cfg.draw_gpm[t], state.temperature_f, temps.cold_f, temps.supply_f)?;
            let step = swing.step(t, state, effective)?;
            state = step.state;
            series.temperature_f[t] = step.state.temperature_f;
            series.element_run[t] = step.element_run;
            series.effective_draw_gal[t] = effective;
        }

        info!(minutes = cfg.len(), "swing-only simulation complete");
        Ok(series)
    }

    /// Series with step 0 filled in. A swing temperature override must be
    /// finite and at or above supply temperature.
    fn initial_swing_series(&self, initial_swing_temp_f: Option<f64>) -> SimResult<SwingSeries> {
        let temps = self.config.temperatures;
        let start_f = initial_swing_temp_f.unwrap_or(temps.storage_f);
        if !(start_f.is_finite() && start_f >= temps.supply_f) {
            return Err(ConfigError::new(
                "initial_swing_temp_f",
                format!(
                    "{start_f} F must not be below the {} F supply temperature",
                    temps.supply_f
                ),
            )
            .into());
        }

        let n = self.config.len();
        let mut series = SwingSeries {
            temperature_f: vec![0.0; n],
            element_run: vec![0.0; n],
            effective_draw_gal: vec![0.0; n],
        };
        series.temperature_f[0] = start_f;
        series.effective_draw_gal[0] = self.config.draw_gpm[0];
        Ok(series)
    }
}
