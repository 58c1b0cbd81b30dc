//! Post-hoc KPI computation from simulation output.

use std::fmt;

use serde::Serialize;

use super::types::SimulationOutput;

/// Aggregate indicators derived from a complete simulation run.
///
/// Computed post-hoc from [`SimulationOutput`] so reported metrics always
/// agree with the step series.
#[derive(Debug, Clone, Serialize)]
pub struct KpiReport {
    pub schematic: String,
    /// Minutes simulated.
    pub minutes: usize,
    /// Minutes with shed commanded.
    pub shed_minutes: usize,
    /// Minutes heating ran while shed was commanded.
    pub shed_violation_minutes: usize,
    /// Share of shed minutes without heating (%). 100 when nothing is shed.
    pub shed_met_pct: f64,
    /// Lowest primary storage volume (gal).
    pub min_volume_gal: f64,
    /// Minute at which the lowest volume occurred.
    pub min_volume_step: usize,
    pub final_volume_gal: f64,
    /// Total hot water generated (gal).
    pub total_generated_gal: f64,
    /// Total hot water drawn at supply temperature (gal).
    pub total_draw_gal: f64,
    /// Minutes ending with the heat pumps on.
    pub heating_minutes: usize,
    pub swing_min_temp_f: Option<f64>,
    pub swing_max_temp_f: Option<f64>,
    /// Element runtime summed over the run (min).
    pub swing_element_minutes: Option<f64>,
    /// No heating occurred during shed.
    pub passed: bool,
}

impl KpiReport {
    /// Computes all KPIs from a completed run.
    pub fn from_output(output: &SimulationOutput) -> Self {
        let shed_minutes = output.load_shift.iter().filter(|s| s.is_shed()).count();
        let violations = output.total_shed_violation_minutes;

        let shed_met_pct = if shed_minutes > 0 {
            100.0 * (1.0 - violations as f64 / shed_minutes as f64)
        } else {
            100.0
        };

        let (min_volume_step, min_volume_gal) = output
            .volume_gal
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (t, v)| if v < best.1 { (t, v) } else { best });

        let swing = output.swing.as_ref();
        let swing_min_temp_f = swing.map(|s| s.temperature_f.iter().copied().fold(f64::INFINITY, f64::min));
        let swing_max_temp_f =
            swing.map(|s| s.temperature_f.iter().copied().fold(f64::NEG_INFINITY, f64::max));

        Self {
            schematic: output.schematic.to_string(),
            minutes: output.len(),
            shed_minutes,
            shed_violation_minutes: violations,
            shed_met_pct,
            min_volume_gal: if output.is_empty() { 0.0 } else { min_volume_gal },
            min_volume_step,
            final_volume_gal: output.volume_gal.last().copied().unwrap_or(0.0),
            total_generated_gal: output.generated_gal.iter().sum(),
            total_draw_gal: output.draw_gpm.iter().sum(),
            heating_minutes: output.heating.iter().filter(|&&h| h).count(),
            swing_min_temp_f,
            swing_max_temp_f,
            swing_element_minutes: swing.map(|s| s.element_run.iter().sum()),
            passed: violations == 0,
        }
    }

    /// Serializes the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ({}) ---", self.schematic)?;
        writeln!(f, "Minutes simulated:     {}", self.minutes)?;
        writeln!(f, "Shed minutes:          {}", self.shed_minutes)?;
        writeln!(f, "Shed violations:       {} min", self.shed_violation_minutes)?;
        writeln!(f, "Shed met:              {:.1}%", self.shed_met_pct)?;
        writeln!(
            f,
            "Minimum volume:        {:.2} gal (t={})",
            self.min_volume_gal, self.min_volume_step
        )?;
        writeln!(f, "Final volume:          {:.2} gal", self.final_volume_gal)?;
        writeln!(f, "Generated:             {:.2} gal", self.total_generated_gal)?;
        writeln!(f, "Drawn:                 {:.2} gal", self.total_draw_gal)?;
        writeln!(f, "Heating minutes:       {}", self.heating_minutes)?;
        if let (Some(lo), Some(hi), Some(run)) = (
            self.swing_min_temp_f,
            self.swing_max_temp_f,
            self.swing_element_minutes,
        ) {
            writeln!(f, "Swing temperature:     {lo:.2} F .. {hi:.2} F")?;
            writeln!(f, "Swing element runtime: {run:.2} min")?;
        }
        write!(f, "Result:                {}", if self.passed { "PASS" } else { "FAIL" })
    }
}
