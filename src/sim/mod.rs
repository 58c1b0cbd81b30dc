pub mod engine;
pub mod kpi;
/// Primary storage hysteresis controller.
pub mod primary;
/// Load-shift schedules and hourly control modes.
pub mod schedule;
pub mod swing;
pub mod types;
pub mod units;
