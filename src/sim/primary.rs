//! Primary storage hysteresis controller.
//!
//! The primary tank is modeled as perfectly stratified: all hot water above
//! the cold boundary sits at storage temperature, so the state is one volume.

use tracing::trace;

use super::schedule::LoadShift;
use super::types::PrimaryState;
use crate::error::{SimError, SimResult};

/// Inputs to one primary step. Volumes are per minute, at storage temperature.
#[derive(Debug, Clone, Copy)]
pub struct PrimaryInput {
    /// Hot water removed this minute (gal, >= 0).
    pub draw_gal: f64,
    /// Hot water the heat pumps can add this minute (gal, >= 0).
    pub generation_gal: f64,
    /// Heating turns on below this volume (gal, < capacity).
    pub trigger_gal: f64,
    pub shift_now: LoadShift,
    pub shift_prev: LoadShift,
}

/// Result of one primary step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimaryStep {
    pub state: PrimaryState,
    /// Volume actually generated this minute (gal).
    pub generated_gal: f64,
    /// Shed was commanded but heating ended the minute active.
    pub shed_violation: bool,
}

/// Primary tank with a fixed capacity ceiling.
#[derive(Debug, Clone, Copy)]
pub struct PrimaryTank {
    capacity_gal: f64,
}

impl PrimaryTank {
    pub fn new(capacity_gal: f64) -> Self {
        Self { capacity_gal }
    }

    pub fn capacity_gal(&self) -> f64 {
        self.capacity_gal
    }

    /// Advances the tank by one minute.
    ///
    /// Precedence: a fresh shed transition switches running heat off while
    /// the tank is above trigger; otherwise running heat generates, or an idle
    /// tank that drops below trigger starts heating for the full minute.
    /// Overflow past capacity is then apportioned back and heating stops.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::PrimaryDepleted`] if the volume goes negative.
    pub fn step(&self, t: usize, state: PrimaryState, input: PrimaryInput) -> SimResult<PrimaryStep> {
        let PrimaryInput {
            draw_gal,
            generation_gal,
            trigger_gal,
            shift_now,
            shift_prev,
        } = input;

        let mut heating = state.heating;
        let mut generated_gal = 0.0;
        let mut volume = state.volume_gal;

        let shed_starts = shift_prev == LoadShift::Allowed && shift_now == LoadShift::Shed;
        if heating && shed_starts && volume > trigger_gal {
            volume -= draw_gal;
            heating = false;
            trace!(t, volume, "shed started, heating forced off");
        } else if heating {
            volume += generation_gal - draw_gal;
            generated_gal = generation_gal;
        } else {
            volume -= draw_gal;
            // Onset is not apportioned within the minute, unlike overflow below.
            if volume < trigger_gal {
                volume += generation_gal;
                generated_gal = generation_gal;
                heating = true;
                trace!(t, volume, trigger_gal, "heating on");
            }
        }

        if volume > self.capacity_gal {
            let net_gal = generation_gal - draw_gal;
            // A non-positive net rate cannot carry a bounded tank past capacity.
            if net_gal > 0.0 {
                let time_over = (volume - self.capacity_gal) / net_gal;
                volume = self.capacity_gal - draw_gal * time_over;
                generated_gal = generation_gal * (1.0 - time_over);
                heating = false;
                trace!(t, time_over, "tank full, heating off");
            }
        }

        if volume < 0.0 {
            return Err(SimError::PrimaryDepleted {
                step: t,
                volume_gal: volume,
            });
        }

        Ok(PrimaryStep {
            state: PrimaryState {
                volume_gal: volume,
                heating,
            },
            generated_gal,
            shed_violation: shift_now.is_shed() && heating,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(draw: f64, generation: f64, trigger: f64) -> PrimaryInput {
        PrimaryInput {
            draw_gal: draw,
            generation_gal: generation,
            trigger_gal: trigger,
            shift_now: LoadShift::Allowed,
            shift_prev: LoadShift::Allowed,
        }
    }

    fn idle(volume_gal: f64) -> PrimaryState {
        PrimaryState {
            volume_gal,
            heating: false,
        }
    }

    fn running(volume_gal: f64) -> PrimaryState {
        PrimaryState {
            volume_gal,
            heating: true,
        }
    }

    #[test]
    fn idle_tank_only_drains() {
        let tank = PrimaryTank::new(100.0);
        let s = tank.step(1, idle(90.0), input(5.0, 30.0, 60.0)).unwrap();
        assert_eq!(s.state, idle(85.0));
        assert_eq!(s.generated_gal, 0.0);
    }

    #[test]
    fn heating_starts_below_trigger_with_full_minute() {
        let tank = PrimaryTank::new(100.0);
        let s = tank.step(1, idle(62.0), input(5.0, 30.0, 60.0)).unwrap();
        assert!(s.state.heating);
        assert_eq!(s.generated_gal, 30.0);
        assert_eq!(s.state.volume_gal, 87.0);
    }

    #[test]
    fn exactly_at_trigger_does_not_start_heating() {
        let tank = PrimaryTank::new(100.0);
        let s = tank.step(1, idle(65.0), input(5.0, 30.0, 60.0)).unwrap();
        assert!(!s.state.heating);
        assert_eq!(s.state.volume_gal, 60.0);
    }

    #[test]
    fn running_tank_adds_generation() {
        let tank = PrimaryTank::new(100.0);
        let s = tank.step(1, running(50.0), input(10.0, 30.0, 60.0)).unwrap();
        assert_eq!(s.state, running(70.0));
        assert_eq!(s.generated_gal, 30.0);
    }

    #[test]
    fn overflow_is_apportioned_and_stops_heating() {
        let tank = PrimaryTank::new(100.0);
        // 90 + 30 - 10 = 110, net rate 20 -> half a minute over capacity
        let s = tank.step(1, running(90.0), input(10.0, 30.0, 60.0)).unwrap();
        assert!(!s.state.heating);
        assert!((s.state.volume_gal - 95.0).abs() < 1e-12);
        assert!((s.generated_gal - 15.0).abs() < 1e-12);
    }

    #[test]
    fn equal_rates_skip_overflow_correction() {
        let tank = PrimaryTank::new(100.0);
        let s = tank.step(1, running(100.0), input(20.0, 20.0, 60.0)).unwrap();
        assert_eq!(s.state, running(100.0));
        assert!(s.state.volume_gal.is_finite());
    }

    #[test]
    fn shed_transition_forces_heating_off_above_trigger() {
        let tank = PrimaryTank::new(100.0);
        let mut i = input(5.0, 30.0, 60.0);
        i.shift_prev = LoadShift::Allowed;
        i.shift_now = LoadShift::Shed;
        let s = tank.step(1, running(70.0), i).unwrap();
        assert!(!s.state.heating);
        assert_eq!(s.state.volume_gal, 65.0);
        assert_eq!(s.generated_gal, 0.0);
        assert!(!s.shed_violation);
    }

    #[test]
    fn shed_transition_below_trigger_keeps_heating_and_flags_violation() {
        let tank = PrimaryTank::new(100.0);
        let mut i = input(5.0, 30.0, 80.0);
        i.shift_prev = LoadShift::Allowed;
        i.shift_now = LoadShift::Shed;
        let s = tank.step(1, running(70.0), i).unwrap();
        assert!(s.state.heating);
        assert_eq!(s.generated_gal, 30.0);
        assert!(s.shed_violation);
    }

    #[test]
    fn continued_shed_does_not_override_running_heat() {
        let tank = PrimaryTank::new(100.0);
        let mut i = input(5.0, 10.0, 60.0);
        i.shift_prev = LoadShift::Shed;
        i.shift_now = LoadShift::Shed;
        let s = tank.step(2, running(70.0), i).unwrap();
        assert!(s.state.heating);
        assert!(s.shed_violation);
    }

    #[test]
    fn negative_volume_is_fatal() {
        let tank = PrimaryTank::new(100.0);
        let err = tank.step(7, idle(3.0), input(10.0, 2.0, 60.0)).unwrap_err();
        assert!(matches!(err, SimError::PrimaryDepleted { step: 7, .. }));
    }
}
