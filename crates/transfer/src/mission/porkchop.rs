//! Porkchop grid search over departure time and time of flight.
//!
//! Cells are independent: each one reads the immutable body table and writes only its own
//! slot. The parallel driver splits the departure axis into contiguous row blocks, evaluates
//! each block on a dedicated rayon pool, and concatenates the blocks in row order.

use std::ops::Range;

use kerbol_core::vector;
use kerbol_ephemeris::{Body, BodyId, KerbolSystem, state_at_time};
use kerbol_impulsive::TransferDirection;
use kerbol_orbits::StateVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use super::delta_v::ejection_capture_dv;
use super::transfer::{TransferError, solve_velocities};

/// Closed interval of times in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Point `k` of `n` evenly spaced samples including both ends; `start` when `n == 1`.
    pub fn sample(&self, k: usize, n: usize) -> f64 {
        if n <= 1 {
            return self.start;
        }
        self.start + (self.end - self.start) * k as f64 / (n - 1) as f64
    }
}

/// Inputs of a porkchop search between two sibling bodies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSearchProblem {
    pub body1: BodyId,
    pub body2: BodyId,
    /// Parking orbit radius at `body1` (body radius plus altitude).
    pub departure_periapsis_radius: f64,
    /// Capture orbit radius at `body2`; `None` skips the capture burn.
    pub capture_periapsis_radius: Option<f64>,
    pub t1_range: TimeRange,
    pub tof_range: TimeRange,
    pub n_grid_t1: usize,
    pub n_grid_tof: usize,
    #[serde(default)]
    pub direction: TransferDirection,
}

impl GridSearchProblem {
    pub fn new(
        body1: BodyId,
        body2: BodyId,
        t1_range: TimeRange,
        tof_range: TimeRange,
        n_grid_t1: usize,
        n_grid_tof: usize,
        departure_periapsis_radius: f64,
    ) -> Self {
        Self {
            body1,
            body2,
            departure_periapsis_radius,
            capture_periapsis_radius: None,
            t1_range,
            tof_range,
            n_grid_t1,
            n_grid_tof,
            direction: TransferDirection::Prograde,
        }
    }

    pub fn with_capture(mut self, capture_periapsis_radius: f64) -> Self {
        self.capture_periapsis_radius = Some(capture_periapsis_radius);
        self
    }

    pub fn with_direction(mut self, direction: TransferDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn cell_count(&self) -> usize {
        self.n_grid_t1 * self.n_grid_tof
    }

    /// Reject malformed grids before any cell is evaluated.
    pub fn validate(&self, system: &KerbolSystem) -> Result<(), GridSearchError> {
        if self.n_grid_t1 == 0 || self.n_grid_tof == 0 {
            return Err(GridSearchError::EmptyGrid {
                n_grid_t1: self.n_grid_t1,
                n_grid_tof: self.n_grid_tof,
            });
        }
        check_range("departure", &self.t1_range, self.n_grid_t1)?;
        check_range("time of flight", &self.tof_range, self.n_grid_tof)?;
        check_radius(self.departure_periapsis_radius)?;
        if let Some(radius) = self.capture_periapsis_radius {
            check_radius(radius)?;
        }
        if system.common_parent(self.body1, self.body2).is_none() {
            return Err(TransferError::NoCommonParent {
                body1: self.body1,
                body2: self.body2,
            }
            .into());
        }
        Ok(())
    }
}

fn check_range(axis: &'static str, range: &TimeRange, n: usize) -> Result<(), GridSearchError> {
    let inverted = range.end < range.start;
    let degenerate = n > 1 && range.end == range.start;
    if !range.start.is_finite() || !range.end.is_finite() || inverted || degenerate {
        return Err(GridSearchError::InvalidRange {
            axis,
            start: range.start,
            end: range.end,
        });
    }
    Ok(())
}

fn check_radius(radius: f64) -> Result<(), GridSearchError> {
    if radius > 0.0 && radius.is_finite() {
        Ok(())
    } else {
        Err(GridSearchError::InvalidPeriapsisRadius(radius))
    }
}

#[derive(Debug, Error)]
pub enum GridSearchError {
    #[error("grid must have at least one point per axis (got {n_grid_t1} x {n_grid_tof})")]
    EmptyGrid { n_grid_t1: usize, n_grid_tof: usize },
    #[error("{axis} range [{start}, {end}] is inverted, degenerate or not finite")]
    InvalidRange {
        axis: &'static str,
        start: f64,
        end: f64,
    },
    #[error("periapsis radius must be positive and finite (got {0})")]
    InvalidPeriapsisRadius(f64),
    #[error("worker count {workers} must be between 1 and the departure grid size {n_grid_t1}")]
    InvalidWorkerCount { workers: usize, n_grid_t1: usize },
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// One evaluated grid point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub t1: f64,
    pub tof: f64,
    pub t2: f64,
    /// `NaN` when no transfer was found.
    pub ejection_dv: f64,
    /// `None` when the problem has no capture orbit; `Some(NaN)` for an invalid cell.
    pub capture_dv: Option<f64>,
}

impl GridCell {
    pub fn valid(&self) -> bool {
        !self.ejection_dv.is_nan()
    }

    /// Ejection plus capture (when requested).
    pub fn total_dv(&self) -> f64 {
        self.ejection_dv + self.capture_dv.unwrap_or(0.0)
    }
}

/// Row-major grid: index `i * n_grid_tof + j` holds departure sample `i`, flight time `j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSearchResult {
    pub n_grid_t1: usize,
    pub n_grid_tof: usize,
    pub t1: Vec<f64>,
    pub tof: Vec<f64>,
    pub ejection_dv: Vec<f64>,
    pub capture_dv: Option<Vec<f64>>,
}

impl GridSearchResult {
    fn with_capacity(rows: usize, n_grid_tof: usize, capture: bool) -> Self {
        let cells = rows * n_grid_tof;
        Self {
            n_grid_t1: rows,
            n_grid_tof,
            t1: Vec::with_capacity(cells),
            tof: Vec::with_capacity(cells),
            ejection_dv: Vec::with_capacity(cells),
            capture_dv: capture.then(|| Vec::with_capacity(cells)),
        }
    }

    /// Append the rows of `block` after the rows already held.
    fn append(&mut self, block: GridSearchResult) {
        self.n_grid_t1 += block.n_grid_t1;
        self.t1.extend(block.t1);
        self.tof.extend(block.tof);
        self.ejection_dv.extend(block.ejection_dv);
        if let (Some(dst), Some(src)) = (self.capture_dv.as_mut(), block.capture_dv) {
            dst.extend(src);
        }
    }

    pub fn len(&self) -> usize {
        self.t1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t1.is_empty()
    }

    /// Cell for departure sample `i` and flight time sample `j`.
    pub fn cell(&self, i: usize, j: usize) -> Option<GridCell> {
        if i >= self.n_grid_t1 || j >= self.n_grid_tof {
            return None;
        }
        Some(self.cell_at(i * self.n_grid_tof + j))
    }

    fn cell_at(&self, index: usize) -> GridCell {
        GridCell {
            t1: self.t1[index],
            tof: self.tof[index],
            t2: self.t1[index] + self.tof[index],
            ejection_dv: self.ejection_dv[index],
            capture_dv: self.capture_dv.as_ref().map(|c| c[index]),
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        (0..self.len()).map(|index| self.cell_at(index))
    }

    pub fn valid_cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.cells().filter(GridCell::valid)
    }

    pub fn min_ejection_cell(&self) -> Option<GridCell> {
        self.valid_cells()
            .min_by(|a, b| a.ejection_dv.total_cmp(&b.ejection_dv))
    }

    pub fn min_total_cell(&self) -> Option<GridCell> {
        self.valid_cells()
            .filter(|cell| !cell.total_dv().is_nan())
            .min_by(|a, b| a.total_dv().total_cmp(&b.total_dv()))
    }
}

/// Evaluate the full grid on the calling thread.
pub fn grid_search(
    system: &KerbolSystem,
    problem: &GridSearchProblem,
) -> Result<GridSearchResult, GridSearchError> {
    problem.validate(system)?;
    debug!(
        body1 = %problem.body1,
        body2 = %problem.body2,
        cells = problem.cell_count(),
        "grid search"
    );
    Ok(evaluate_rows(system, problem, 0..problem.n_grid_t1))
}

/// Evaluate the grid on a pool of exactly `workers` threads.
///
/// The departure axis is split into `workers` contiguous blocks by [`partition_rows`]; the
/// result is identical to [`grid_search`].
pub fn grid_search_parallel(
    system: &KerbolSystem,
    problem: &GridSearchProblem,
    workers: usize,
) -> Result<GridSearchResult, GridSearchError> {
    problem.validate(system)?;
    if workers == 0 || workers > problem.n_grid_t1 {
        return Err(GridSearchError::InvalidWorkerCount {
            workers,
            n_grid_t1: problem.n_grid_t1,
        });
    }

    let partitions = partition_rows(problem.n_grid_t1, workers);
    debug!(
        body1 = %problem.body1,
        body2 = %problem.body2,
        cells = problem.cell_count(),
        workers,
        "dispatching grid search"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;
    let blocks: Vec<GridSearchResult> = pool.install(|| {
        partitions
            .par_iter()
            .map(|rows| evaluate_rows(system, problem, rows.clone()))
            .collect()
    });

    let mut result = GridSearchResult::with_capacity(
        0,
        problem.n_grid_tof,
        problem.capture_periapsis_radius.is_some(),
    );
    for block in blocks {
        result.append(block);
    }
    Ok(result)
}

/// Split `n` rows into `workers` contiguous, non-empty ranges covering `0..n` in order.
///
/// The first `n % workers` ranges hold one extra row.
///
/// # Panics
///
/// Panics if `workers` is zero or larger than `n`.
pub fn partition_rows(n: usize, workers: usize) -> Vec<Range<usize>> {
    assert!(
        workers > 0 && workers <= n,
        "cannot split {n} rows across {workers} workers"
    );
    let base = n / workers;
    let extra = n % workers;
    let mut start = 0;
    (0..workers)
        .map(|w| {
            let len = base + usize::from(w < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

fn evaluate_rows(
    system: &KerbolSystem,
    problem: &GridSearchProblem,
    rows: Range<usize>,
) -> GridSearchResult {
    let capture = problem.capture_periapsis_radius;
    let mut block =
        GridSearchResult::with_capacity(rows.len(), problem.n_grid_tof, capture.is_some());

    // validated upstream
    let Some(parent) = system.common_parent(problem.body1, problem.body2) else {
        return block;
    };

    for i in rows.clone() {
        let t1 = problem.t1_range.sample(i, problem.n_grid_t1);
        let row = RowContext {
            system,
            problem,
            parent,
            departure_body: system.body(problem.body1),
            arrival_body: system.body(problem.body2),
            departure: state_at_time(system, t1, parent.id, problem.body1),
        };
        for j in 0..problem.n_grid_tof {
            let tof = problem.tof_range.sample(j, problem.n_grid_tof);
            let (ejection, capture_dv) = row.evaluate_cell(tof);
            block.t1.push(t1);
            block.tof.push(tof);
            block.ejection_dv.push(ejection);
            if let Some(c) = block.capture_dv.as_mut() {
                c.push(capture_dv);
            }
        }
    }

    debug!(rows = ?rows, cells = block.len(), "grid block evaluated");
    block
}

/// Everything a cell needs that is fixed along one departure row.
struct RowContext<'a> {
    system: &'a KerbolSystem,
    problem: &'a GridSearchProblem,
    parent: &'a Body,
    departure_body: &'a Body,
    arrival_body: &'a Body,
    /// `body1` relative to `parent` at this row's `t1`.
    departure: StateVector,
}

impl RowContext<'_> {
    fn evaluate_cell(&self, tof: f64) -> (f64, f64) {
        let t1 = self.departure.time;
        if tof <= 0.0 {
            trace!(t1, tof, "skipping cell with non-positive time of flight");
            return (f64::NAN, f64::NAN);
        }

        let problem = self.problem;
        let arrival = state_at_time(self.system, t1 + tof, self.parent.id, problem.body2);
        match solve_velocities(&self.departure, &arrival, self.parent.mu, problem.direction) {
            Ok(solution) => {
                let v_inf_departure = vector::sub(&solution.v1, &self.departure.velocity);
                let ejection = ejection_capture_dv(
                    self.departure_body,
                    &v_inf_departure,
                    problem.departure_periapsis_radius,
                );
                let capture = match problem.capture_periapsis_radius {
                    Some(radius) => {
                        let v_inf_arrival = vector::sub(&solution.v2, &arrival.velocity);
                        ejection_capture_dv(self.arrival_body, &v_inf_arrival, radius)
                    }
                    None => f64::NAN,
                };
                (ejection, capture)
            }
            Err(err) => {
                trace!(t1, tof, error = %err, "no transfer for cell");
                (f64::NAN, f64::NAN)
            }
        }
    }
}
