//! Swing tank temperature controller.
//!
//! The swing tank sits in series after the primary storage and absorbs
//! recirculation loop losses with a resistance element. It is treated as well
//! mixed, so the state is a single average temperature. Loop losses are a
//! constant power; flow rate and return temperature do not enter.

use tracing::trace;

use super::types::{SwingState, SwingTankConfig, Temperatures};
use super::units::SWING_DEADBAND_F;
use crate::error::{SimError, SimResult};

/// Result of one swing tank step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingStep {
    pub state: SwingState,
    /// Fraction of the minute the element ran (may exceed 1 on onset).
    pub element_run: f64,
}

/// Swing tank with per-minute loss and element rates precomputed.
#[derive(Debug, Clone, Copy)]
pub struct SwingTank {
    volume_gal: f64,
    trigger_f: f64,
    storage_f: f64,
    supply_f: f64,
    recirc_loss_f: f64,
    element_heat_f: f64,
}

impl SwingTank {
    pub fn new(config: &SwingTankConfig, temperatures: &Temperatures) -> Self {
        Self {
            volume_gal: config.volume_gal,
            trigger_f: config.trigger_temp_f,
            storage_f: temperatures.storage_f,
            supply_f: temperatures.supply_f,
            recirc_loss_f: config.recirc_loss_per_minute(),
            element_heat_f: config.element_heat_per_minute(),
        }
    }

    /// Element shut-off temperature.
    pub fn cutout_f(&self) -> f64 {
        self.trigger_f + SWING_DEADBAND_F
    }

    /// Advances the tank by one minute given the volume drawn through it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::SwingTankUndersized`] when the tank ends the minute
    /// below supply temperature.
    pub fn step(&self, t: usize, state: SwingState, draw_gal: f64) -> SimResult<SwingStep> {
        let mut element_on = state.element_on;
        let mut element_run = 0.0;

        let mut temp = state.temperature_f - self.recirc_loss_f;

        // Drawn water is replaced from primary storage.
        if draw_gal > 0.0 {
            temp += draw_gal * (self.storage_f - state.temperature_f) / self.volume_gal;
        }

        if element_on {
            temp += self.element_heat_f;
            element_run = 1.0;

            let cutout = self.cutout_f();
            if temp > cutout {
                let time_over = (temp - cutout) / self.element_heat_f;
                temp -= self.element_heat_f * time_over;
                element_run = 1.0 - time_over;
                element_on = false;
                trace!(t, temp, "swing element off");
            }
        } else if temp <= self.trigger_f {
            let time_missed = (self.trigger_f - temp) / self.element_heat_f;
            temp += self.element_heat_f * time_missed;
            element_run = time_missed;
            element_on = true;
            trace!(t, temp, "swing element on");
        }

        if temp < self.supply_f {
            return Err(SimError::SwingTankUndersized {
                step: t,
                temperature_f: temp,
                supply_f: self.supply_f,
            });
        }

        Ok(SwingStep {
            state: SwingState {
                temperature_f: temp,
                element_on,
            },
            element_run,
        })
    }
}
