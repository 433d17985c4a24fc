//! Single-revolution Lambert solver in the universal-variable formulation.
//!
//! The time-of-flight equation `F(z) = 0` is solved with Newton steps on `z`, kept inside
//! a bracket `[z_lo, z_hi]` that always contains the root. Any step that leaves the bracket
//! or lands where `y(z) < 0` falls back to bisection, so the iteration cannot wander into
//! the non-physical branch.

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use kerbol_core::stumpff;
use kerbol_core::vector::{self, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relative tolerance on the time-of-flight residual.
pub const TIME_TOLERANCE: f64 = 1e-8;
/// Iteration cap for the safeguarded Newton loop.
pub const MAX_ITERATIONS: usize = 200;

/// Just below the `z = 4π²` singularity where the single-revolution time of flight diverges.
const Z_UPPER: f64 = 4.0 * PI * PI - 1e-6;
const Z_LOWER_START: f64 = -4.0 * PI * PI;
const MAX_BRACKET_EXPANSIONS: usize = 12;
/// Below this `|z|` the closed-form derivative is replaced by its limit at zero.
const Z_ZERO_BAND: f64 = 1e-6;
const SIN_EPSILON: f64 = 1e-9;

/// Sense of motion of the transfer arc about the reference z axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    #[default]
    Prograde,
    Retrograde,
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prograde => "prograde",
            Self::Retrograde => "retrograde",
        })
    }
}

impl FromStr for TransferDirection {
    type Err = LambertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prograde" => Ok(Self::Prograde),
            "retrograde" => Ok(Self::Retrograde),
            _ => Err(LambertError::UnknownDirection(s.to_string())),
        }
    }
}

/// Velocities at both ends of the transfer arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LambertSolution {
    pub v1: Vector3,
    pub v2: Vector3,
    /// Converged universal parameter `z = α χ²` (positive for ellipses).
    pub z: f64,
    pub iterations: usize,
}

#[derive(Debug, Error, PartialEq)]
pub enum LambertError {
    #[error("time of flight must be positive and finite (got {0})")]
    InvalidTimeOfFlight(f64),
    #[error("gravitational parameter must be positive and finite (got {0})")]
    InvalidGravitationalParameter(f64),
    #[error("degenerate transfer geometry: {0}")]
    DegenerateGeometry(&'static str),
    #[error("no single-revolution solution brackets a time of flight of {0} s")]
    NoSolution(f64),
    #[error("lambert solver did not converge within {0} iterations")]
    NonConvergence(usize),
    #[error("unknown transfer direction `{0}` (expected prograde or retrograde)")]
    UnknownDirection(String),
}

/// Transfer angle from `r1` to `r2` travelling in `direction`, in `[0, 2π)`.
pub fn transfer_angle(r1: &Vector3, r2: &Vector3, direction: TransferDirection) -> f64 {
    let theta = vector::angle_between(r1, r2);
    let cz = vector::cross(r1, r2)[2];
    let flip = match direction {
        TransferDirection::Prograde => cz <= 0.0,
        TransferDirection::Retrograde => cz >= 0.0,
    };
    if flip { TAU - theta } else { theta }
}

/// Geometry shared by every evaluation of the time-of-flight function.
struct Geometry {
    r1: f64,
    r2: f64,
    a: f64,
    sqrt_mu: f64,
    dt: f64,
}

impl Geometry {
    fn y(&self, z: f64) -> f64 {
        let (c, s) = stumpff::c_and_s(z);
        self.r1 + self.r2 + self.a * (z * s - 1.0) / c.sqrt()
    }

    /// `F(z) = (y/C)^1.5 S + A √y - √μ Δt`, or `None` where `y(z) < 0`.
    fn residual(&self, z: f64) -> Option<f64> {
        let y = self.y(z);
        if y < 0.0 {
            return None;
        }
        let (c, s) = stumpff::c_and_s(z);
        Some((y / c).powf(1.5) * s + self.a * y.sqrt() - self.sqrt_mu * self.dt)
    }

    fn derivative(&self, z: f64) -> f64 {
        let y = self.y(z);
        if z.abs() < Z_ZERO_BAND {
            return 2f64.sqrt() / 40.0 * y.powf(1.5)
                + self.a / 8.0 * (y.sqrt() + self.a * (1.0 / (2.0 * y)).sqrt());
        }
        let (c, s) = stumpff::c_and_s(z);
        (y / c).powf(1.5) * ((c - 1.5 * s / c) / (2.0 * z) + 0.75 * s * s / c)
            + self.a / 8.0 * (3.0 * s / c * y.sqrt() + self.a * (c / y).sqrt())
    }

    /// Residual with the `y < 0` region treated as zero time of flight, which keeps the
    /// function monotone for bracketing.
    fn bracket_residual(&self, z: f64) -> f64 {
        self.residual(z).unwrap_or(-self.sqrt_mu * self.dt)
    }
}

/// Solve Lambert's problem for the arc from `r1` to `r2` taking `dt` seconds.
///
/// Units are those of the inputs (`mu` in length³/s², positions in length).
pub fn solve(
    r1: Vector3,
    r2: Vector3,
    dt: f64,
    mu: f64,
    direction: TransferDirection,
) -> Result<LambertSolution, LambertError> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(LambertError::InvalidTimeOfFlight(dt));
    }
    if !mu.is_finite() || mu <= 0.0 {
        return Err(LambertError::InvalidGravitationalParameter(mu));
    }

    let r1_norm = vector::norm(&r1);
    let r2_norm = vector::norm(&r2);
    if r1_norm < vector::NORMALIZE_EPSILON || r2_norm < vector::NORMALIZE_EPSILON {
        return Err(LambertError::DegenerateGeometry("zero position vector"));
    }
    if !r1_norm.is_finite() || !r2_norm.is_finite() {
        return Err(LambertError::DegenerateGeometry("non-finite position vector"));
    }

    let theta = transfer_angle(&r1, &r2, direction);
    let (sin_theta, cos_theta) = theta.sin_cos();
    if 1.0 - cos_theta < SIN_EPSILON {
        return Err(LambertError::DegenerateGeometry("coincident directions"));
    }
    if sin_theta.abs() < SIN_EPSILON {
        return Err(LambertError::DegenerateGeometry("opposite directions"));
    }

    let geometry = Geometry {
        r1: r1_norm,
        r2: r2_norm,
        a: sin_theta * (r1_norm * r2_norm / (1.0 - cos_theta)).sqrt(),
        sqrt_mu: mu.sqrt(),
        dt,
    };

    let (z, iterations) = find_z(&geometry)?;

    let y = geometry.y(z);
    let f = 1.0 - y / r1_norm;
    let g = geometry.a * (y / mu).sqrt();
    let g_dot = 1.0 - y / r2_norm;
    if g.abs() < f64::EPSILON || !g.is_finite() {
        return Err(LambertError::DegenerateGeometry("vanishing lagrange coefficient g"));
    }

    let v1 = vector::scale(&vector::sub(&r2, &vector::scale(&r1, f)), 1.0 / g);
    let v2 = vector::scale(&vector::sub(&vector::scale(&r2, g_dot), &r1), 1.0 / g);
    if !v1.iter().chain(v2.iter()).all(|c| c.is_finite()) {
        return Err(LambertError::NonConvergence(iterations));
    }

    Ok(LambertSolution {
        v1,
        v2,
        z,
        iterations,
    })
}

fn find_z(geometry: &Geometry) -> Result<(f64, usize), LambertError> {
    let tolerance = TIME_TOLERANCE * geometry.sqrt_mu * geometry.dt;

    let mut hi = Z_UPPER;
    if geometry.bracket_residual(hi) <= 0.0 {
        return Err(LambertError::NoSolution(geometry.dt));
    }
    let mut lo = Z_LOWER_START;
    let mut expansions = 0;
    while geometry.bracket_residual(lo) > 0.0 {
        if expansions == MAX_BRACKET_EXPANSIONS {
            return Err(LambertError::NoSolution(geometry.dt));
        }
        hi = lo;
        lo *= 2.0;
        expansions += 1;
    }

    let mut z = 0.0_f64.clamp(lo, hi);
    for iteration in 1..=MAX_ITERATIONS {
        let Some(residual) = geometry.residual(z) else {
            lo = z;
            z = 0.5 * (lo + hi);
            continue;
        };
        if residual.abs() < tolerance {
            return Ok((z, iteration));
        }
        if residual < 0.0 {
            lo = z;
        } else {
            hi = z;
        }

        let step = z - residual / geometry.derivative(z);
        z = if step.is_finite() && step > lo && step < hi {
            step
        } else {
            0.5 * (lo + hi)
        };

        if hi - lo <= f64::EPSILON * hi.abs().max(lo.abs()).max(1.0) {
            return Ok((z, iteration));
        }
    }

    Err(LambertError::NonConvergence(MAX_ITERATIONS))
}
