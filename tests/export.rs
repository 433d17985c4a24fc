use std::fs;

use kerbol_trajectory::ephemeris::{BodyId, KerbolSystem};
use kerbol_trajectory::export::porkchop::{HEADER, write_grid, write_grid_to_path};
use kerbol_trajectory::export::summary::{PorkchopSummary, write_summary};
use kerbol_trajectory::transfer::{GridSearchProblem, GridSearchResult, TimeRange, grid_search};
use tempfile::tempdir;

fn small_grid(capture: bool) -> (GridSearchProblem, GridSearchResult) {
    let system = KerbolSystem::standard();
    let mut problem = GridSearchProblem::new(
        BodyId::Kerbin,
        BodyId::Duna,
        TimeRange::new(0.0, 4.0e6),
        TimeRange::new(4.0e6, 8.0e6),
        3,
        2,
        700_000.0,
    );
    if capture {
        problem = problem.with_capture(380_000.0);
    }
    let result = grid_search(system, &problem).expect("grid");
    (problem, result)
}

#[test]
fn csv_has_header_and_one_row_per_cell() {
    let (_, result) = small_grid(true);
    let mut buffer = Vec::new();
    write_grid(&mut buffer, &result).expect("write");

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let headers: Vec<String> = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_owned)
        .collect();
    assert_eq!(headers, HEADER);

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), result.len());
    assert_eq!(&rows[1][0], "0.0");
    assert_eq!(rows[1][1].parse::<f64>().unwrap(), 8.0e6);
    assert_eq!(rows[1][2].parse::<f64>().unwrap(), 8.0e6);
    for row in &rows {
        let valid: bool = row[5].parse().unwrap();
        let ejection: f64 = row[3].parse().unwrap();
        assert_eq!(valid, !ejection.is_nan());
    }
}

#[test]
fn csv_leaves_capture_column_empty_without_capture_orbit() {
    let (_, result) = small_grid(false);
    let mut buffer = Vec::new();
    write_grid(&mut buffer, &result).expect("write");

    let text = String::from_utf8(buffer).unwrap();
    for line in text.lines().skip(1) {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[4], "");
    }
}

#[test]
fn csv_written_to_nested_path() {
    let (_, result) = small_grid(true);
    let dir = tempdir().unwrap();
    let path = dir.path().join("artifacts").join("kerbin_duna.csv");
    write_grid_to_path(&path, &result).expect("write");

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("t1_s,tof_s,t2_s,ejection_dv_m_s,capture_dv_m_s,valid"));
    assert_eq!(text.lines().count(), result.len() + 1);
}

#[test]
fn summary_reports_cheapest_cells() {
    let (problem, result) = small_grid(true);
    let summary = PorkchopSummary::new(&problem, &result);
    assert_eq!(summary.cells, 6);
    assert_eq!(summary.valid_cells, result.valid_cells().count());

    let mut buffer = Vec::new();
    write_summary(&mut buffer, &summary).expect("write");
    let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

    assert_eq!(json["from"], "kerbin");
    assert_eq!(json["to"], "duna");
    assert_eq!(json["departure_periapsis_radius_m"], 700_000.0);
    assert_eq!(json["cells"], 6);
    if let Some(best) = summary.min_total {
        assert_eq!(json["min_total"]["t1"], best.t1);
    }
}
