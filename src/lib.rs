//! Minute-step simulator for central heat pump water heater plants with
//! load shifting and an optional swing tank.

/// TOML scenario configuration and presets.
pub mod config;
pub mod error;
/// CSV export of step telemetry and sweep results.
pub mod io;
/// Tank controllers, the time-step driver, and KPIs.
pub mod sim;
pub mod sweep;
