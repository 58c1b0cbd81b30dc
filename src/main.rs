//! HPWH plant simulator entry point: CLI wiring and scenario-driven runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hpwh_sim::config::ScenarioConfig;
use hpwh_sim::error::{ConfigError, SimError, SimResult};
use hpwh_sim::io::export::{export_csv, export_sweep_csv};
use hpwh_sim::sim::engine::Simulator;
use hpwh_sim::sim::kpi::KpiReport;
use hpwh_sim::sweep::run_sweep;

#[derive(Parser)]
#[command(name = "hpwh-sim")]
#[command(about = "Heat pump water heater plant simulator with load shifting", long_about = None)]
struct Cli {
    /// Load scenario from a TOML config file
    #[arg(long, conflicts_with = "preset")]
    scenario: Option<PathBuf>,
    /// Use a built-in preset (swing_tank, primary, load_shift)
    #[arg(long)]
    preset: Option<String>,
    /// Export step results to CSV
    #[arg(long)]
    telemetry_out: Option<PathBuf>,
    /// Write the KPI summary as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,
    /// Run only the swing tank against the raw draw profile
    #[arg(long, conflicts_with = "sweep")]
    swing_only: bool,
    /// Run the storage volume by capacity sizing sweep
    #[arg(long)]
    sweep: bool,
    /// Export sweep rows to CSV (with --sweep)
    #[arg(long, requires = "sweep")]
    sweep_out: Option<PathBuf>,
    /// Suppress per-step output
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_scenario(cli: &Cli) -> SimResult<ScenarioConfig> {
    let scenario = match (&cli.scenario, &cli.preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path)?,
        (None, Some(name)) => ScenarioConfig::from_preset(name)?,
        (None, None) => ScenarioConfig::swing_tank(),
    };

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        return Err(
            ConfigError::new("scenario", format!("{} invalid field(s)", errors.len())).into(),
        );
    }
    Ok(scenario)
}

fn run_single(cli: &Cli, scenario: &ScenarioConfig) -> SimResult<()> {
    let built = scenario.build()?;
    let output = built.run()?;

    if !cli.quiet {
        for r in output.records() {
            println!("{r}");
        }
    }

    let kpi = KpiReport::from_output(&output);
    println!("\n{kpi}");

    if let Some(path) = &cli.telemetry_out {
        export_csv(&output, path)?;
        info!(path = %path.display(), "telemetry written");
    }
    if let Some(path) = &cli.summary_json {
        write_summary(&kpi, path)?;
    }
    Ok(())
}

fn run_swing_only(cli: &Cli, scenario: &ScenarioConfig) -> SimResult<()> {
    let built = scenario.build()?;
    let sim = Simulator::new(built.sim_config)?;
    let series = sim.simulate_swing_only(built.initial_swing_temp_f)?;

    if !cli.quiet {
        for (t, (temp, run)) in series
            .temperature_f
            .iter()
            .zip(&series.element_run)
            .enumerate()
        {
            println!(
                "t={t:>5} | swing={temp:>6.2} F  element={run:.3}  draw={:.3} gal",
                series.effective_draw_gal[t]
            );
        }
    }

    let min = series.temperature_f.iter().copied().fold(f64::INFINITY, f64::min);
    let drawn: f64 = series.effective_draw_gal.iter().sum();
    let element: f64 = series.element_run.iter().sum();
    println!("\n--- Swing Tank ---");
    println!("Minimum temperature:   {min:.2} F");
    println!("Element runtime:       {element:.2} min");
    println!("Effective draw:        {drawn:.2} gal");
    Ok(())
}

fn run_sizing_sweep(cli: &Cli, scenario: &ScenarioConfig) -> SimResult<()> {
    let rows = run_sweep(scenario);

    if !cli.quiet {
        for row in &rows {
            let outcome = match (&row.kpi, &row.error) {
                (Some(k), _) => format!(
                    "violations={} min  met={:.1}%  {}",
                    k.shed_violation_minutes,
                    k.shed_met_pct,
                    if k.passed { "PASS" } else { "FAIL" }
                ),
                (None, Some(e)) => format!("error: {e}"),
                (None, None) => String::new(),
            };
            println!(
                "V={:>7.1} gal  cap={:>6.1} kBTU/hr | {outcome}",
                row.storage_volume_gal, row.capacity_kbtuhr
            );
        }
    }

    let passed = rows.iter().filter(|r| r.passed()).count();
    println!("\nSweep points:          {}", rows.len());
    println!("Passing points:        {passed}");

    if let Some(path) = &cli.sweep_out {
        export_sweep_csv(&rows, path)?;
        info!(path = %path.display(), "sweep results written");
    }
    Ok(())
}

fn write_summary(kpi: &KpiReport, path: &Path) -> SimResult<()> {
    let json = kpi.to_json().map_err(|e| SimError::Io(e.to_string()))?;
    fs::write(path, json)?;
    info!(path = %path.display(), "summary written");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = load_scenario(&cli).and_then(|scenario| {
        if cli.sweep {
            run_sizing_sweep(&cli, &scenario)
        } else if cli.swing_only {
            run_swing_only(&cli, &scenario)
        } else {
            run_single(&cli, &scenario)
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
