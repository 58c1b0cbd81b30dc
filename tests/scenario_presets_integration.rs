use std::process::Command;

#[derive(Debug)]
struct Kpis {
    shed_violation_minutes: f64,
    shed_met_pct: f64,
    min_volume_gal: f64,
    generated_gal: f64,
}

#[test]
fn scenario_files_run_via_cli_and_produce_distinct_dynamics() {
    let primary = run_and_parse_kpis(&["--scenario", "scenarios/primary.toml"]);
    let swing = run_and_parse_kpis(&["--scenario", "scenarios/swing_tank.toml"]);
    let load_shift = run_and_parse_kpis(&["--scenario", "scenarios/load_shift.toml"]);

    assert_eq!(primary.shed_violation_minutes, 0.0);
    assert_eq!(primary.shed_met_pct, 100.0);
    assert_eq!(swing.shed_met_pct, 100.0);
    assert!(
        (primary.generated_gal - swing.generated_gal).abs() > 1.0,
        "expected primary and swing tank generation to differ: primary={:.3}, swing={:.3}",
        primary.generated_gal,
        swing.generated_gal
    );
    assert!(
        (0.0..=100.0).contains(&load_shift.shed_met_pct),
        "shed met out of range: {load_shift:?}"
    );
}

#[test]
fn presets_match_scenario_files() {
    for name in ["primary", "load_shift"] {
        let from_preset = run_and_parse_kpis(&["--preset", name]);
        let from_file = run_and_parse_kpis(&["--scenario", &format!("scenarios/{name}.toml")]);
        assert_eq!(
            from_preset.min_volume_gal, from_file.min_volume_gal,
            "preset {name} differs from its scenario file"
        );
        assert_eq!(
            from_preset.shed_violation_minutes,
            from_file.shed_violation_minutes
        );
    }
}

#[test]
fn invalid_scenario_exits_with_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_hpwh-sim"))
        .args(["--preset", "nonexistent", "--quiet"])
        .output()
        .expect("hpwh-sim process should run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown preset"), "stderr: {stderr}");
}

#[test]
fn sweep_writes_csv() {
    let out_path = std::env::temp_dir().join(format!("hpwh-sweep-{}.csv", std::process::id()));
    let output = Command::new(env!("CARGO_BIN_EXE_hpwh-sim"))
        .args(["--scenario", "scenarios/load_shift.toml", "--sweep", "--quiet"])
        .arg("--sweep-out")
        .arg(&out_path)
        .output()
        .expect("hpwh-sim process should run");
    assert!(
        output.status.success(),
        "sweep failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let csv = std::fs::read_to_string(&out_path).expect("sweep CSV should exist");
    let _ = std::fs::remove_file(&out_path);
    // header plus 5 volumes x 4 capacities
    assert_eq!(csv.lines().count(), 21);
    assert!(csv.starts_with("storage_volume_gal,capacity_kbtuhr"));
}

fn run_and_parse_kpis(args: &[&str]) -> Kpis {
    let output = Command::new(env!("CARGO_BIN_EXE_hpwh-sim"))
        .args(args)
        .arg("--quiet")
        .output()
        .expect("hpwh-sim process should run");

    assert!(
        output.status.success(),
        "scenario run failed for {args:?}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    parse_kpis(&stdout)
}

fn parse_kpis(stdout: &str) -> Kpis {
    Kpis {
        shed_violation_minutes: parse_metric(stdout, "Shed violations:", "min"),
        shed_met_pct: parse_metric(stdout, "Shed met:", "%"),
        min_volume_gal: parse_metric(stdout, "Minimum volume:", "gal"),
        generated_gal: parse_metric(stdout, "Generated:", "gal"),
    }
}

fn parse_metric(stdout: &str, label: &str, unit: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing KPI line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid KPI format for line `{line}`"));

    // "Minimum volume" carries a trailing "(t=...)".
    let value = raw.split(unit).next().unwrap_or(raw).trim();
    value
        .parse::<f64>()
        .unwrap_or_else(|_| panic!("failed parsing `{value}` from KPI line `{line}`"))
}
