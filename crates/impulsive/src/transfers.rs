//! Analytic estimator for impulsive transfers in the coplanar, circular limit.
//!
//! Used to seed time-of-flight search windows; the grid search itself always solves the
//! full Lambert problem.

use serde::{Deserialize, Serialize};

/// Hohmann transfer between circular, coplanar orbits of radii `r1` and `r2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HohmannResult {
    pub dv1: f64,      // signed: negative for inward (retro) burn
    pub dv2: f64,      // signed: negative for retro capture when arriving inward
    pub dv_total: f64, // |dv1| + |dv2|
    /// Half the period of the transfer ellipse.
    pub time_of_flight: f64,
}

/// Compute the classical Hohmann transfer around a central body with parameter `mu`.
///
/// Inputs share one unit system: radii in m with `mu` in m³/s² yields m/s and seconds.
pub fn hohmann(r1: f64, r2: f64, mu: f64) -> HohmannResult {
    assert!(r1 > 0.0 && r2 > 0.0 && mu > 0.0);

    let v1 = (mu / r1).sqrt();
    let v2 = (mu / r2).sqrt();
    let a_t = 0.5 * (r1 + r2);
    let time_of_flight = std::f64::consts::PI * (a_t.powi(3) / mu).sqrt();

    // vis-viva at both apsides of the transfer ellipse
    let v_t1 = (mu * (2.0 / r1 - 1.0 / a_t)).sqrt();
    let v_t2 = (mu * (2.0 / r2 - 1.0 / a_t)).sqrt();

    let dv1 = v_t1 - v1;
    let dv2 = v2 - v_t2;

    HohmannResult {
        dv1,
        dv2,
        dv_total: dv1.abs() + dv2.abs(),
        time_of_flight,
    }
}
