//! Storage volume by heating capacity sizing sweeps.
//!
//! Each grid point is an independent simulation, so points run in parallel
//! with no shared state.

use rayon::prelude::*;
use tracing::info;

use crate::config::ScenarioConfig;
use crate::error::SimError;
use crate::sim::kpi::KpiReport;

/// Outcome of one sweep grid point.
#[derive(Debug, Clone)]
pub struct SweepRow {
    pub storage_volume_gal: f64,
    pub capacity_kbtuhr: f64,
    pub load_up_capacity_kbtuhr: f64,
    /// KPIs when the run completed.
    pub kpi: Option<KpiReport>,
    /// Failure message when the scenario was invalid or the run aborted.
    pub error: Option<String>,
}

impl SweepRow {
    pub fn passed(&self) -> bool {
        self.kpi.as_ref().is_some_and(|k| k.passed)
    }
}

/// Runs `base` at every (storage volume, capacity) point of its sweep grid.
///
/// Rows come back in grid order, storage volume major. A failing point is
/// recorded in its row and does not stop the sweep.
pub fn run_sweep(base: &ScenarioConfig) -> Vec<SweepRow> {
    let grid: Vec<(f64, f64)> = base
        .sweep
        .storage_volumes_gal
        .iter()
        .flat_map(|&v| base.sweep.capacities_kbtuhr.iter().map(move |&c| (v, c)))
        .collect();

    let rows: Vec<SweepRow> = grid
        .par_iter()
        .map(|&(volume, capacity)| run_point(base, volume, capacity))
        .collect();

    info!(
        points = rows.len(),
        passed = rows.iter().filter(|r| r.passed()).count(),
        "sweep complete"
    );
    rows
}

fn run_point(base: &ScenarioConfig, storage_volume_gal: f64, capacity_kbtuhr: f64) -> SweepRow {
    let cfg = base.resized(storage_volume_gal, capacity_kbtuhr);
    let load_up_capacity_kbtuhr = cfg.heating.load_up_capacity_kbtuhr.unwrap_or(capacity_kbtuhr);

    let result = cfg
        .build()
        .map_err(SimError::from)
        .and_then(|scenario| scenario.run());

    let (kpi, error) = match result {
        Ok(output) => (Some(KpiReport::from_output(&output)), None),
        Err(e) => (None, Some(e.to_string())),
    };

    SweepRow {
        storage_volume_gal,
        capacity_kbtuhr,
        load_up_capacity_kbtuhr,
        kpi,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid(volumes: Vec<f64>, capacities: Vec<f64>) -> ScenarioConfig {
        let mut cfg = ScenarioConfig::load_shift();
        cfg.sweep.storage_volumes_gal = volumes;
        cfg.sweep.capacities_kbtuhr = capacities;
        cfg
    }

    #[test]
    fn rows_follow_grid_order() {
        let cfg = small_grid(vec![300.0, 600.0], vec![100.0, 200.0, 300.0]);
        let rows = run_sweep(&cfg);
        let points: Vec<(f64, f64)> = rows
            .iter()
            .map(|r| (r.storage_volume_gal, r.capacity_kbtuhr))
            .collect();
        assert_eq!(
            points,
            vec![
                (300.0, 100.0),
                (300.0, 200.0),
                (300.0, 300.0),
                (600.0, 100.0),
                (600.0, 200.0),
                (600.0, 300.0),
            ]
        );
        assert!(
            rows.iter()
                .all(|r| (r.load_up_capacity_kbtuhr - 1.1 * r.capacity_kbtuhr).abs() < 1e-9)
        );
    }

    #[test]
    fn invalid_point_is_recorded_not_fatal() {
        let cfg = small_grid(vec![-10.0, 600.0], vec![200.0]);
        let rows = run_sweep(&cfg);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].kpi.is_none());
        assert!(
            rows[0]
                .error
                .as_deref()
                .is_some_and(|e| e.contains("tank.storage_volume_gal"))
        );
        assert!(rows[1].error.is_none(), "{:?}", rows[1].error);
        assert!(rows[1].kpi.is_some());
    }

    #[test]
    fn empty_grid_yields_no_rows() {
        let cfg = small_grid(Vec::new(), vec![100.0]);
        assert!(run_sweep(&cfg).is_empty());
    }

    #[test]
    fn larger_plants_violate_less() {
        let cfg = small_grid(vec![200.0, 1000.0], vec![300.0]);
        let rows = run_sweep(&cfg);
        let violations = |r: &SweepRow| r.kpi.as_ref().map(|k| k.shed_violation_minutes);
        assert!(violations(&rows[1]) <= violations(&rows[0]));
        assert_eq!(violations(&rows[1]), Some(0));
    }
}
