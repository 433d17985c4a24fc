//! Stumpff functions `C(z)` and `S(z)` used by the universal-variable formulations.
//!
//! Both functions are continuous through `z = 0`. Close to zero the closed forms lose
//! precision to cancellation, so a truncated Taylor series is evaluated instead.

/// Below this `|z|` the series expansions are used.
pub const SERIES_THRESHOLD: f64 = 1e-3;

/// `C(z) = (1 - cos √z) / z` for `z > 0`, `(cosh √-z - 1) / -z` for `z < 0`.
pub fn c(z: f64) -> f64 {
    if z.abs() < SERIES_THRESHOLD {
        // 1/2! - z/4! + z²/6! - z³/8!
        0.5 - z / 24.0 + z * z / 720.0 - z * z * z / 40_320.0
    } else if z > 0.0 {
        (1.0 - z.sqrt().cos()) / z
    } else {
        ((-z).sqrt().cosh() - 1.0) / -z
    }
}

/// `S(z) = (√z - sin √z) / √z³` for `z > 0`, `(sinh √-z - √-z) / √-z³` for `z < 0`.
pub fn s(z: f64) -> f64 {
    if z.abs() < SERIES_THRESHOLD {
        // 1/3! - z/5! + z²/7! - z³/9!
        1.0 / 6.0 - z / 120.0 + z * z / 5_040.0 - z * z * z / 362_880.0
    } else if z > 0.0 {
        let sz = z.sqrt();
        (sz - sz.sin()) / (sz * sz * sz)
    } else {
        let sz = (-z).sqrt();
        (sz.sinh() - sz) / (sz * sz * sz)
    }
}

/// Evaluate both functions at once.
#[inline]
pub fn c_and_s(z: f64) -> (f64, f64) {
    (c(z), s(z))
}
