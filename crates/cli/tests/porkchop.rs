use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn config_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../configs/porkchop")
        .join(name)
}

fn kerbin_duna_args(output: &str) -> Vec<String> {
    [
        "--from",
        "kerbin",
        "--to",
        "DUNA",
        "--depart-start",
        "0",
        "--depart-end",
        "9200000",
        "--tof-min",
        "3000000",
        "--tof-max",
        "10000000",
        "--grid",
        "6",
        "--output",
        output,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[test]
fn porkchop_writes_csv_grid() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("pork.csv");

    Command::cargo_bin("porkchop")
        .expect("porkchop bin")
        .args(kerbin_duna_args(csv_path.to_str().unwrap()))
        .args(["--capture-altitude", "60000", "--workers", "3"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Kerbin -> Duna"));

    let text = fs::read_to_string(&csv_path).expect("csv output");
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("t1_s,tof_s,t2_s,ejection_dv_m_s,capture_dv_m_s,valid")
    );
    assert_eq!(lines.count(), 36);
}

#[test]
fn porkchop_streams_csv_to_stdout() {
    Command::cargo_bin("porkchop")
        .expect("porkchop bin")
        .args(kerbin_duna_args("-"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("t1_s,tof_s,t2_s"));
}

#[test]
fn porkchop_writes_json_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("pork.csv");
    let summary_path = dir.path().join("summary.json");

    Command::cargo_bin("porkchop")
        .expect("porkchop bin")
        .args(kerbin_duna_args(csv_path.to_str().unwrap()))
        .args(["--summary", summary_path.to_str().unwrap()])
        .assert()
        .success();

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary_path).expect("summary"))
            .expect("summary json");
    assert_eq!(summary["from"], "kerbin");
    assert_eq!(summary["to"], "duna");
    assert_eq!(summary["cells"], 36);
    assert!(summary["capture_periapsis_radius_m"].is_null());
}

#[test]
fn porkchop_runs_every_job_in_a_config_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let jobs = dir.path().join("jobs");
    fs::create_dir(&jobs).unwrap();
    fs::write(
        jobs.join("kerbin_duna.toml"),
        r#"
name = "duna"
from = "Kerbin"
to = "Duna"
departure_start_s = 0.0
departure_end_s = 9.2e6
tof_min_s = 3.0e6
tof_max_s = 1.0e7
grid_departure = 4
grid_tof = 4
parking_altitude_m = 100000.0
"#,
    )
    .unwrap();
    fs::write(
        jobs.join("kerbin_eve.toml"),
        r#"
name = "eve"
from = "Kerbin"
to = "Eve"
departure_start_s = 0.0
departure_end_s = 9.2e6
tof_min_s = 2.0e6
tof_max_s = 7.0e6
grid_departure = 4
grid_tof = 4
parking_altitude_m = 100000.0
workers = 2
"#,
    )
    .unwrap();

    let output = dir.path().join("pork.csv");
    Command::cargo_bin("porkchop")
        .expect("porkchop bin")
        .args([
            "--config",
            jobs.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert!(dir.path().join("pork_duna.csv").exists());
    assert!(dir.path().join("pork_eve.csv").exists());
    assert!(!output.exists());
}

#[test]
fn porkchop_accepts_bundled_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("kerbin_duna.csv");

    Command::cargo_bin("porkchop")
        .expect("porkchop bin")
        .args([
            "--config",
            config_path("kerbin_duna.toml").to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let rows = fs::read_to_string(&output).expect("csv").lines().count();
    assert_eq!(rows, 40 * 40 + 1);
}

#[test]
fn porkchop_rejects_unknown_body() {
    let mut args = kerbin_duna_args("-");
    args[1] = "Earth".into();
    Command::cargo_bin("porkchop")
        .expect("porkchop bin")
        .args(args)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Earth"));
}

#[test]
fn porkchop_rejects_more_workers_than_rows() {
    Command::cargo_bin("porkchop")
        .expect("porkchop bin")
        .args(kerbin_duna_args("-"))
        .args(["--workers", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("workers"));
}

#[test]
fn porkchop_requires_bodies_without_config() {
    Command::cargo_bin("porkchop")
        .expect("porkchop bin")
        .args(["--grid", "4"])
        .assert()
        .failure();
}
