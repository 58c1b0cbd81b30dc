//! CSV export for simulation step records and sweep rows.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::{SimulationOutput, StepRecord};
use crate::sweep::SweepRow;

/// Column header for step telemetry.
const HEADER: &str = "timestep,time_hr,draw_gpm,generation_gpm,volume_gal,generated_gal,\
                      heating,shed,shed_violation,swing_temp_f,swing_element_run,\
                      effective_swing_draw_gal";

/// Column header for sweep results.
const SWEEP_HEADER: &str = "storage_volume_gal,capacity_kbtuhr,load_up_capacity_kbtuhr,\
                            shed_violation_minutes,shed_met_pct,min_volume_gal,passed,error";

/// Exports a run to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(output: &SimulationOutput, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(&output.records(), buf)
}

/// Writes step records as CSV to any writer.
///
/// Swing columns are left empty for runs without a swing tank. Output is
/// deterministic for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(records: &[StepRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    let opt = |v: Option<f64>| v.map(|x| format!("{x:.4}")).unwrap_or_default();
    for r in records {
        wtr.write_record(&[
            r.timestep.to_string(),
            format!("{:.4}", r.time_hr),
            format!("{:.4}", r.draw_gpm),
            format!("{:.4}", r.generation_gpm),
            format!("{:.4}", r.volume_gal),
            format!("{:.4}", r.generated_gal),
            r.heating.to_string(),
            r.shed.to_string(),
            r.shed_violation.to_string(),
            opt(r.swing_temp_f),
            opt(r.swing_element_run),
            opt(r.effective_swing_draw_gal),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports sweep rows to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_sweep_csv(rows: &[SweepRow], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_sweep_csv(rows, io::BufWriter::new(file))
}

/// Writes sweep rows as CSV to any writer, one row per grid point.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_sweep_csv(rows: &[SweepRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(SWEEP_HEADER.split(',').map(str::trim))?;

    for row in rows {
        let (violations, met, min_vol, passed) = match &row.kpi {
            Some(k) => (
                k.shed_violation_minutes.to_string(),
                format!("{:.2}", k.shed_met_pct),
                format!("{:.2}", k.min_volume_gal),
                k.passed.to_string(),
            ),
            None => (String::new(), String::new(), String::new(), "false".to_string()),
        };
        wtr.write_record(&[
            format!("{:.1}", row.storage_volume_gal),
            format!("{:.1}", row.capacity_kbtuhr),
            format!("{:.1}", row.load_up_capacity_kbtuhr),
            violations,
            met,
            min_vol,
            passed,
            row.error.clone().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
