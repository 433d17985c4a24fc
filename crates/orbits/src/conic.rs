//! Classical propagation along an elliptical orbit and conic sampling helpers.

use kerbol_core::constants::TAU;
use kerbol_core::units::wrap_two_pi;
use kerbol_core::vector::Vector3;

use crate::elements::{KeplerianElements, StateVector, state_at_true_anomaly};
use crate::{OrbitError, anomaly, check_mu, hyperbolic};

/// Fraction of the asymptote angle covered when sampling a hyperbolic locus.
const HYPERBOLIC_LOCUS_SPAN: f64 = 0.9;

/// Orbital period `2π √(a³ / μ)`; `NaN` for non-elliptical (`a <= 0`) orbits.
pub fn orbital_period(semi_major_axis: f64, mu: f64) -> f64 {
    if semi_major_axis <= 0.0 {
        return f64::NAN;
    }
    TAU * (semi_major_axis.powi(3) / mu).sqrt()
}

/// Mean motion `√(μ / a³)`; `NaN` for non-elliptical orbits.
pub fn mean_motion(semi_major_axis: f64, mu: f64) -> f64 {
    if semi_major_axis <= 0.0 {
        return f64::NAN;
    }
    (mu / semi_major_axis.powi(3)).sqrt()
}

/// Advance an elliptical orbit by `dt` seconds (negative values propagate backwards).
///
/// The result keeps the orbit shape and orientation and carries the new true anomaly and
/// epoch `elements.epoch + dt`.
pub fn propagate(
    elements: &KeplerianElements,
    dt: f64,
    mu: f64,
) -> Result<KeplerianElements, OrbitError> {
    check_mu(mu)?;
    if !elements.is_elliptical() {
        return Err(OrbitError::NotElliptical {
            eccentricity: elements.eccentricity,
        });
    }

    let e = elements.eccentricity;
    let mean_anomaly = anomaly::mean_from_true(elements.true_anomaly, e)
        + mean_motion(elements.semi_major_axis, mu) * dt;
    let true_anomaly = anomaly::true_from_mean(mean_anomaly, e);

    Ok(KeplerianElements {
        true_anomaly: wrap_two_pi(true_anomaly),
        epoch: elements.epoch + dt,
        ..*elements
    })
}

/// Propagate to the absolute epoch `t`.
pub fn propagate_to(
    elements: &KeplerianElements,
    t: f64,
    mu: f64,
) -> Result<KeplerianElements, OrbitError> {
    propagate(elements, t - elements.epoch, mu)
}

/// State vectors at each absolute epoch in `times`.
///
/// Every sample is propagated independently from `elements`, so entry `k` matches
/// `propagate_to(elements, times[k], mu)` exactly.
pub fn propagate_many(
    elements: &KeplerianElements,
    times: &[f64],
    mu: f64,
) -> Result<Vec<StateVector>, OrbitError> {
    times
        .iter()
        .map(|&t| {
            let advanced = propagate_to(elements, t, mu)?;
            Ok(state_at_true_anomaly(&advanced, mu, advanced.true_anomaly))
        })
        .collect()
}

/// `samples` positions evenly spaced in true anomaly along the conic.
///
/// Ellipses are sampled over a full turn starting at apoapsis. Hyperbolas are sampled
/// symmetrically about periapsis up to 90% of the asymptote angle.
pub fn state_locus(
    elements: &KeplerianElements,
    mu: f64,
    samples: usize,
) -> Result<Vec<Vector3>, OrbitError> {
    check_mu(mu)?;
    if samples < 2 {
        return Err(OrbitError::InvalidSampleCount(samples));
    }

    let (start, end) = if elements.eccentricity < 1.0 {
        (-std::f64::consts::PI, std::f64::consts::PI)
    } else {
        let limit =
            HYPERBOLIC_LOCUS_SPAN * hyperbolic::true_anomaly_at_infinity(elements.eccentricity);
        (-limit, limit)
    };

    let step = (end - start) / (samples - 1) as f64;
    Ok((0..samples)
        .map(|k| {
            let theta = start + step * k as f64;
            state_at_true_anomaly(elements, mu, theta).position
        })
        .collect())
}
