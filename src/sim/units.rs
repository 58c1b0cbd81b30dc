//! Unit conversions, physical constants, and temperature mixing.

use crate::error::ConfigError;

/// Density times specific heat of water, BTU per gallon per °F.
pub const RHO_CP: f64 = 8.353535;
/// Watts to BTU per hour.
pub const W_TO_BTUHR: f64 = 3.412142;
pub const MINUTES_PER_HOUR: usize = 60;
pub const HOURS_PER_DAY: usize = 24;
/// Swing element shuts off this many °F above its trigger temperature.
pub const SWING_DEADBAND_F: f64 = 8.0;

/// Converts a volume at `hot_f` into the energy-equivalent volume delivered at `out_f`.
///
/// `vol * (out_f - cold_f) / (hot_f - cold_f)`. With `out_f == hot_f` the
/// volume is unchanged; with `out_f == cold_f` it is zero.
///
/// # Errors
///
/// Returns a `ConfigError` if `hot_f == cold_f`.
///
/// # Examples
///
/// ```
/// use hpwh_sim::sim::units::mix_volume;
///
/// let v = mix_volume(10.0, 150.0, 50.0, 120.0).unwrap();
/// assert!((v - 7.0).abs() < 1e-12);
/// ```
pub fn mix_volume(vol: f64, hot_f: f64, cold_f: f64, out_f: f64) -> Result<f64, ConfigError> {
    let delta = hot_f - cold_f;
    if delta == 0.0 {
        return Err(ConfigError::new(
            "temperatures",
            format!("mixing reference {hot_f} F equals cold water temperature {cold_f} F"),
        ));
    }
    Ok(vol * (out_f - cold_f) / delta)
}

/// Repeats each hourly value once per minute.
pub fn hourly_to_minutely<T: Clone>(hourly: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(hourly.len() * MINUTES_PER_HOUR);
    for v in hourly {
        out.extend(std::iter::repeat_n(v.clone(), MINUTES_PER_HOUR));
    }
    out
}

/// Heating capacity (kBTU/hr) to hot-water generation rate (gal/hr) across `delta_f`.
pub fn kbtuhr_to_gph(capacity_kbtuhr: f64, delta_f: f64) -> f64 {
    1000.0 * capacity_kbtuhr / RHO_CP / delta_f
}

/// Temperature change per minute produced by `watts` in a well-mixed `volume_gal`.
pub fn watts_to_degf_per_minute(watts: f64, volume_gal: f64) -> f64 {
    watts * W_TO_BTUHR / MINUTES_PER_HOUR as f64 / RHO_CP / volume_gal
}
