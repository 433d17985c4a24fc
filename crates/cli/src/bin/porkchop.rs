use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::Parser;
use kerbol_cli::{find_body, init_tracing};
use kerbol_trajectory::config::{PorkchopConfig, load_porkchop_configs};
use kerbol_trajectory::ephemeris::KerbolSystem;
use kerbol_trajectory::export::porkchop as export_porkchop;
use kerbol_trajectory::export::summary::{PorkchopSummary, write_summary_to_path};
use kerbol_trajectory::transfer::{
    GridCell, GridSearchProblem, TransferDirection, grid_search, grid_search_parallel,
};
use tracing::info;

/// Generate porkchop data (CSV) for ballistic transfers by sweeping departure time and time of flight.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Porkchop CSV generator (patched-conic, Lambert)"
)]
struct Cli {
    /// Porkchop job file (YAML list, TOML file, or directory of TOML files)
    #[arg(
        long,
        conflicts_with_all = ["from", "to", "depart_start", "depart_end", "tof_min", "tof_max"]
    )]
    config: Option<PathBuf>,

    /// Departure body name (case-insensitive)
    #[arg(long, required_unless_present = "config")]
    from: Option<String>,

    /// Destination body name (case-insensitive)
    #[arg(long, required_unless_present = "config")]
    to: Option<String>,

    /// Departure window start (seconds of universal time)
    #[arg(long, required_unless_present = "config")]
    depart_start: Option<f64>,

    /// Departure window end (seconds of universal time)
    #[arg(long, required_unless_present = "config")]
    depart_end: Option<f64>,

    /// Shortest time of flight (seconds)
    #[arg(long, required_unless_present = "config")]
    tof_min: Option<f64>,

    /// Longest time of flight (seconds)
    #[arg(long, required_unless_present = "config")]
    tof_max: Option<f64>,

    /// Grid points along each axis
    #[arg(long, default_value_t = 50)]
    grid: usize,

    /// Parking orbit altitude at the departure body in metres
    #[arg(long, default_value_t = 100_000.0)]
    parking_altitude: f64,

    /// Capture orbit altitude at the destination in metres (enables the capture burn)
    #[arg(long)]
    capture_altitude: Option<f64>,

    /// Search retrograde transfers instead of prograde
    #[arg(long, default_value_t = false)]
    retrograde: bool,

    /// Worker threads splitting the departure axis (defaults to a single thread)
    #[arg(long)]
    workers: Option<usize>,

    /// Output CSV file (use '-' for stdout)
    #[arg(long, default_value = "artifacts/porkchop.csv")]
    output: PathBuf,

    /// Optional JSON summary of the cheapest cells (use '-' for stdout)
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let system = KerbolSystem::standard();

    let jobs = match &cli.config {
        Some(path) => load_porkchop_configs(path)
            .with_context(|| format!("failed to load porkchop jobs from {}", path.display()))?,
        None => vec![config_from_flags(&cli)?],
    };
    if jobs.is_empty() {
        return Err(anyhow!("no porkchop jobs found"));
    }

    let multiple = jobs.len() > 1;
    for (index, job) in jobs.iter().enumerate() {
        let mut job = job.clone();
        if cli.workers.is_some() {
            job.workers = cli.workers;
        }
        let problem = job.to_problem(system)?;

        let label = job.name.clone().unwrap_or_else(|| index.to_string());
        let output = if multiple {
            suffixed(&cli.output, &label)
        } else {
            cli.output.clone()
        };
        run_job(
            system,
            &problem,
            job.workers,
            &output,
            cli.summary.as_deref(),
            multiple.then_some(label.as_str()),
        )?;
    }
    Ok(())
}

fn config_from_flags(cli: &Cli) -> anyhow::Result<PorkchopConfig> {
    let system = KerbolSystem::standard();
    let missing = |flag: &str| anyhow!("--{flag} is required without --config");
    let from = cli.from.clone().ok_or_else(|| missing("from"))?;
    let to = cli.to.clone().ok_or_else(|| missing("to"))?;
    find_body(system, &from)?;
    find_body(system, &to)?;

    Ok(PorkchopConfig {
        name: None,
        from,
        to,
        departure_start_s: cli.depart_start.ok_or_else(|| missing("depart-start"))?,
        departure_end_s: cli.depart_end.ok_or_else(|| missing("depart-end"))?,
        tof_min_s: cli.tof_min.ok_or_else(|| missing("tof-min"))?,
        tof_max_s: cli.tof_max.ok_or_else(|| missing("tof-max"))?,
        grid_departure: cli.grid,
        grid_tof: cli.grid,
        parking_altitude_m: cli.parking_altitude,
        capture_altitude_m: cli.capture_altitude,
        workers: cli.workers,
        direction: if cli.retrograde {
            TransferDirection::Retrograde
        } else {
            TransferDirection::Prograde
        },
    })
}

fn run_job(
    system: &KerbolSystem,
    problem: &GridSearchProblem,
    workers: Option<usize>,
    output: &Path,
    summary_path: Option<&Path>,
    label: Option<&str>,
) -> anyhow::Result<()> {
    let result = match workers {
        Some(workers) => grid_search_parallel(system, problem, workers)?,
        None => grid_search(system, problem)?,
    };
    info!(
        from = %problem.body1,
        to = %problem.body2,
        cells = result.len(),
        "grid search complete"
    );

    export_porkchop::write_grid_to_path(output, &result)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let summary = PorkchopSummary::new(problem, &result);
    if let Some(path) = summary_path {
        let path = match label {
            Some(label) => suffixed(path, label),
            None => path.to_path_buf(),
        };
        write_summary_to_path(&path, &summary)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    eprintln!(
        "{} -> {}: {} of {} cells valid",
        problem.body1, problem.body2, summary.valid_cells, summary.cells
    );
    if let Some(cell) = &summary.min_ejection {
        eprintln!("  cheapest ejection: {}", describe(cell));
    }
    if problem.capture_periapsis_radius.is_some() {
        if let Some(cell) = &summary.min_total {
            eprintln!("  cheapest total:    {}", describe(cell));
        }
    }
    if output != Path::new("-") {
        eprintln!("  wrote {}", output.display());
    }
    Ok(())
}

fn describe(cell: &GridCell) -> String {
    let mut text = format!(
        "t1 = {:.0} s, tof = {:.0} s, ejection {:.1} m/s",
        cell.t1, cell.tof, cell.ejection_dv
    );
    if let Some(capture) = cell.capture_dv {
        text.push_str(&format!(
            ", capture {capture:.1} m/s, total {:.1} m/s",
            cell.total_dv()
        ));
    }
    text
}

/// `dir/stem_label.ext` for per-job outputs.
fn suffixed(path: &Path, label: &str) -> PathBuf {
    if path == Path::new("-") {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("porkchop");
    let file_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{label}.{ext}"),
        None => format!("{stem}_{label}"),
    };
    path.with_file_name(file_name)
}
