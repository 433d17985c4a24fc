//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] io::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod porkchop {
    use std::io::Write;
    use std::path::Path;

    use kerbol_transfer::{GridCell, GridSearchResult};
    use serde::Serialize;

    use super::{ExportError, writer_for_path};

    /// Column order of the porkchop CSV.
    pub const HEADER: [&str; 6] = [
        "t1_s",
        "tof_s",
        "t2_s",
        "ejection_dv_m_s",
        "capture_dv_m_s",
        "valid",
    ];

    /// CSV row emitted by the porkchop exporter. Invalid cells carry `NaN` delta-v.
    #[derive(Debug, Clone, Copy, Serialize)]
    pub struct Record {
        pub t1_s: f64,
        pub tof_s: f64,
        pub t2_s: f64,
        pub ejection_dv_m_s: f64,
        /// Empty when the job has no capture orbit.
        pub capture_dv_m_s: Option<f64>,
        pub valid: bool,
    }

    impl From<GridCell> for Record {
        fn from(cell: GridCell) -> Self {
            Self {
                t1_s: cell.t1,
                tof_s: cell.tof,
                t2_s: cell.t2,
                ejection_dv_m_s: cell.ejection_dv,
                capture_dv_m_s: cell.capture_dv,
                valid: cell.valid(),
            }
        }
    }

    /// Write every cell of `result` in row-major order, header first.
    pub fn write_grid<W: Write>(writer: W, result: &GridSearchResult) -> Result<(), ExportError> {
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv.write_record(HEADER)?;
        for cell in result.cells() {
            csv.serialize(Record::from(cell))?;
        }
        csv.flush()?;
        Ok(())
    }

    /// [`write_grid`] to a file path, or stdout for `-`.
    pub fn write_grid_to_path(path: &Path, result: &GridSearchResult) -> Result<(), ExportError> {
        write_grid(writer_for_path(path)?, result)
    }
}

pub mod summary {
    use std::io::Write;
    use std::path::Path;

    use kerbol_ephemeris::BodyId;
    use kerbol_transfer::{GridCell, GridSearchProblem, GridSearchResult};
    use serde::Serialize;

    use super::{ExportError, writer_for_path};

    /// Headline numbers of one porkchop search.
    #[derive(Debug, Clone, Serialize)]
    pub struct PorkchopSummary {
        pub from: BodyId,
        pub to: BodyId,
        pub departure_periapsis_radius_m: f64,
        pub capture_periapsis_radius_m: Option<f64>,
        pub cells: usize,
        pub valid_cells: usize,
        pub min_ejection: Option<GridCell>,
        pub min_total: Option<GridCell>,
    }

    impl PorkchopSummary {
        pub fn new(problem: &GridSearchProblem, result: &GridSearchResult) -> Self {
            Self {
                from: problem.body1,
                to: problem.body2,
                departure_periapsis_radius_m: problem.departure_periapsis_radius,
                capture_periapsis_radius_m: problem.capture_periapsis_radius,
                cells: result.len(),
                valid_cells: result.valid_cells().count(),
                min_ejection: result.min_ejection_cell(),
                min_total: result.min_total_cell(),
            }
        }
    }

    pub fn write_summary<W: Write>(
        mut writer: W,
        summary: &PorkchopSummary,
    ) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(&mut writer, summary)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    /// [`write_summary`] to a file path, or stdout for `-`.
    pub fn write_summary_to_path(
        path: &Path,
        summary: &PorkchopSummary,
    ) -> Result<(), ExportError> {
        write_summary(writer_for_path(path)?, summary)
    }
}
