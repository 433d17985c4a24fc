//! Anomaly conversions and the iterative solvers for Kepler's equation.
//!
//! The elliptical solver works on eccentric anomaly `E` and is only defined for
//! `0 <= e < 1`. The universal solver works on the universal variable `χ` and covers
//! every conic section through the Stumpff functions.

use std::f64::consts::PI;

use kerbol_core::constants::TAU;
use kerbol_core::stumpff;

use crate::{OrbitError, check_mu};

/// Convergence threshold on the Newton step for both solvers.
pub const ANOMALY_TOLERANCE: f64 = 1e-12;
/// Iteration cap for the elliptical Kepler solver.
pub const KEPLER_MAX_ITER: usize = 100;
/// Iteration cap for the universal anomaly solver.
pub const UNIVERSAL_MAX_ITER: usize = 100;

/// `|α r0|` below which the universal solver treats the orbit as near parabolic.
const REGIME_THRESHOLD: f64 = 1e-6;
/// Doublings allowed while bracketing the universal anomaly.
const MAX_BRACKET_EXPANSIONS: usize = 64;

/// Solve `M = E - e sin E` for the eccentric anomaly.
///
/// `mean_anomaly` may be any real value; whole turns are carried through so the
/// returned `E` satisfies the equation for the unreduced `M`.
///
/// # Panics
///
/// Panics if `eccentricity` is outside `[0, 1)` or if Newton's method fails to converge,
/// which cannot happen for a valid elliptical orbit.
pub fn eccentric_from_mean(mean_anomaly: f64, eccentricity: f64) -> f64 {
    assert!(
        (0.0..1.0).contains(&eccentricity),
        "elliptical Kepler equation requires 0 <= e < 1 (got {eccentricity})"
    );

    let turns = (mean_anomaly / TAU).floor();
    let m = mean_anomaly - turns * TAU;

    let mut e_anom = if eccentricity < 0.8 { m } else { PI };
    for _ in 0..KEPLER_MAX_ITER {
        let f = e_anom - eccentricity * e_anom.sin() - m;
        let f_prime = 1.0 - eccentricity * e_anom.cos();
        let delta = f / f_prime;
        e_anom -= delta;
        if delta.abs() < ANOMALY_TOLERANCE {
            return e_anom + turns * TAU;
        }
    }

    panic!("Kepler equation failed to converge for M = {mean_anomaly}, e = {eccentricity}");
}

/// Mean anomaly from eccentric anomaly.
#[inline]
pub fn mean_from_eccentric(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    eccentric_anomaly - eccentricity * eccentric_anomaly.sin()
}

/// True anomaly from eccentric anomaly (elliptical orbits).
///
/// Uses the half-angle form through `atan2`, so the result follows the quadrant of `E`
/// without a `tan(E/2)` singularity at apoapsis.
pub fn true_from_eccentric(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let half = 0.5 * eccentric_anomaly;
    2.0 * ((1.0 + eccentricity).sqrt() * half.sin())
        .atan2((1.0 - eccentricity).sqrt() * half.cos())
}

/// Eccentric anomaly from true anomaly (elliptical orbits).
pub fn eccentric_from_true(true_anomaly: f64, eccentricity: f64) -> f64 {
    let half = 0.5 * true_anomaly;
    2.0 * ((1.0 - eccentricity).sqrt() * half.sin())
        .atan2((1.0 + eccentricity).sqrt() * half.cos())
}

/// Mean anomaly from true anomaly (elliptical orbits).
pub fn mean_from_true(true_anomaly: f64, eccentricity: f64) -> f64 {
    mean_from_eccentric(eccentric_from_true(true_anomaly, eccentricity), eccentricity)
}

/// True anomaly from mean anomaly, solving Kepler's equation on the way.
pub fn true_from_mean(mean_anomaly: f64, eccentricity: f64) -> f64 {
    true_from_eccentric(eccentric_from_mean(mean_anomaly, eccentricity), eccentricity)
}

/// Inputs of the universal Kepler equation at the reference epoch.
#[derive(Debug, Clone, Copy)]
pub struct UniversalProblem {
    /// Distance from the focus at the reference epoch.
    pub r0: f64,
    /// Radial velocity `r·v / |r|` at the reference epoch.
    pub vr0: f64,
    /// Reciprocal semi-major axis `2/r - v²/μ` (negative for hyperbolas).
    pub alpha: f64,
    pub mu: f64,
}

impl UniversalProblem {
    /// Residual of the universal Kepler equation and its derivative with respect to `χ`.
    ///
    /// Where the Stumpff functions overflow (large `χ` on a hyperbola) the residual is
    /// reported as an infinity carrying the sign of `χ`, since the time of flight grows
    /// monotonically with `χ`.
    fn residual(&self, chi: f64, dt: f64) -> (f64, f64) {
        let sqrt_mu = self.mu.sqrt();
        let chi2 = chi * chi;
        let z = self.alpha * chi2;
        let (c, s) = stumpff::c_and_s(z);
        let radial = self.r0 * self.vr0 / sqrt_mu;
        let shape = 1.0 - self.alpha * self.r0;

        let f = radial * chi2 * c + shape * chi2 * chi * s + self.r0 * chi - sqrt_mu * dt;
        let f_prime = radial * chi * (1.0 - z * s) + shape * chi2 * c + self.r0;
        if f.is_finite() {
            (f, f_prime)
        } else {
            (f64::INFINITY.copysign(chi), f64::INFINITY)
        }
    }

    /// Starting `χ` for the regime set by `α r0`.
    ///
    /// Ellipses use `√μ α dt`. Hyperbolas use the logarithmic estimate
    /// `sign(dt) √(-a) ln(-2μα dt / (r·v + sign(dt) √(-μa) (1 - α r0)))`, falling back to
    /// `√μ dt / r0` when that estimate is unusable or the orbit is near parabolic.
    fn initial_guess(&self, dt: f64) -> f64 {
        let sqrt_mu = self.mu.sqrt();
        let linear = sqrt_mu * dt / self.r0;
        let shape = self.alpha * self.r0;
        if shape > REGIME_THRESHOLD {
            return sqrt_mu * self.alpha * dt;
        }
        if shape < -REGIME_THRESHOLD {
            let a = 1.0 / self.alpha;
            let numerator = -2.0 * self.mu * self.alpha * dt;
            let denominator = self.r0 * self.vr0
                + dt.signum() * (-self.mu * a).sqrt() * (1.0 - shape);
            let guess = dt.signum() * (-a).sqrt() * (numerator / denominator).ln();
            if guess.is_finite() && guess * dt > 0.0 {
                return guess;
            }
        }
        linear
    }

    /// Interval `[lo, hi]` on which the residual changes sign, grown by doubling from
    /// `guess`.
    fn bracket(&self, guess: f64, dt: f64) -> Result<(f64, f64), OrbitError> {
        let mut far = guess;
        let mut near = 0.0;
        for _ in 0..MAX_BRACKET_EXPANSIONS {
            let (f, _) = self.residual(far, dt);
            if f * dt.signum() > 0.0 {
                return Ok(if dt > 0.0 { (near, far) } else { (far, near) });
            }
            near = far;
            far *= 2.0;
        }
        Err(OrbitError::NonConvergence {
            solver: "universal anomaly bracket",
            iterations: MAX_BRACKET_EXPANSIONS,
        })
    }
}

/// Solve the universal Kepler equation for `χ` after `dt` seconds.
///
/// Newton's method runs inside a sign-change bracket and falls back to bisection whenever a
/// step would leave it, so convergence does not depend on the quality of the initial guess.
pub fn universal_anomaly(problem: &UniversalProblem, dt: f64) -> Result<f64, OrbitError> {
    check_mu(problem.mu)?;
    if dt == 0.0 {
        return Ok(0.0);
    }
    if !dt.is_finite() || !problem.alpha.is_finite() || problem.r0.is_nan() || problem.r0 <= 0.0 {
        return Err(OrbitError::DegenerateState);
    }

    let guess = problem.initial_guess(dt);
    let (mut lo, mut hi) = problem.bracket(guess, dt)?;
    let mut chi = guess.clamp(lo, hi);
    for _ in 0..UNIVERSAL_MAX_ITER {
        let (f, f_prime) = problem.residual(chi, dt);
        if f == 0.0 {
            return Ok(chi);
        }
        if f < 0.0 {
            lo = chi;
        } else {
            hi = chi;
        }

        let newton = chi - f / f_prime;
        let next = if newton.is_finite() && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
        let step = (next - chi).abs();
        chi = next;
        let scale = chi.abs().max(1.0);
        if step < ANOMALY_TOLERANCE * scale || hi - lo < ANOMALY_TOLERANCE * scale {
            return Ok(chi);
        }
    }

    Err(OrbitError::NonConvergence {
        solver: "universal anomaly",
        iterations: UNIVERSAL_MAX_ITER,
    })
}
