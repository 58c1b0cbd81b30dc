//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use hpwh_sim::sim::types::{Schematic, SimConfig, SwingTankConfig, Temperatures};

/// Standard plant temperatures (50 F cold, 150 F storage, 120 F supply).
pub fn default_temperatures() -> Temperatures {
    Temperatures {
        cold_f: 50.0,
        storage_f: 150.0,
        supply_f: 120.0,
    }
}

/// Storage and supply at the same temperature so draw and generation pass
/// through mixing unchanged.
pub fn unmixed_temperatures() -> Temperatures {
    Temperatures {
        cold_f: 50.0,
        storage_f: 120.0,
        supply_f: 120.0,
    }
}

/// Default swing tank (80 gal, 121 F trigger, 2.7 kW loop loss, 5 kW element).
pub fn default_swing_tank() -> SwingTankConfig {
    SwingTankConfig {
        volume_gal: 80.0,
        trigger_temp_f: 121.0,
        recirc_loss_w: 2700.0,
        element_kw: 5.0,
    }
}

/// Primary-only plant with constant rates and trigger volume.
pub fn constant_primary(n: usize, draw: f64, generation: f64, trigger: f64, v0: f64) -> SimConfig {
    SimConfig {
        generation_gpm: vec![generation; n],
        draw_gpm: vec![draw; n],
        trigger_volume_gal: vec![trigger; n],
        storage_volume_gal: v0,
        temperatures: unmixed_temperatures(),
        schematic: Schematic::Primary,
        swing_tank: None,
    }
}

/// Swing tank plant over `n` minutes with the default swing tank.
pub fn constant_swing(n: usize, draw: f64, generation: f64) -> SimConfig {
    SimConfig {
        generation_gpm: vec![generation; n],
        draw_gpm: vec![draw; n],
        trigger_volume_gal: vec![180.0; n],
        storage_volume_gal: 300.0,
        temperatures: default_temperatures(),
        schematic: Schematic::SwingTank,
        swing_tank: Some(default_swing_tank()),
    }
}

/// Flags for `n` minutes with minutes in `shed` set to shed (`0`).
pub fn shed_flags(n: usize, shed: std::ops::Range<usize>) -> Vec<u8> {
    (0..n).map(|t| u8::from(!shed.contains(&t))).collect()
}
