//! Hyperbolic escape and capture trajectories defined by their excess velocity.

use kerbol_core::vector::{self, Vector3};

use crate::elements::{
    KeplerianElements, StateVector, elements_from_state_vector, state_at_true_anomaly,
};
use crate::{OrbitError, check_mu};

/// Fraction of the asymptote angle used to approximate "at infinity".
const NEAR_INFINITY_FRACTION: f64 = 0.9999999;

/// Half-angle of the asymptotes, `acos(-1/e)`. `NaN` for closed orbits.
pub fn true_anomaly_at_infinity(eccentricity: f64) -> f64 {
    (-1.0 / eccentricity).acos()
}

/// Hyperbola with periapsis radius `periapsis_radius` whose outbound asymptote is parallel
/// to `v_infinity`.
///
/// The orbital plane is the one containing `v_infinity` that is closest to the reference
/// equator; when `v_infinity` is parallel to the z axis the plane contains the x axis.
/// The returned elements sit at periapsis with epoch 0.
pub fn fit_hyperbolic_trajectory(
    v_infinity: &Vector3,
    periapsis_radius: f64,
    mu: f64,
) -> Result<KeplerianElements, OrbitError> {
    check_mu(mu)?;
    let v_inf = vector::norm(v_infinity);
    if v_inf < vector::NORMALIZE_EPSILON
        || periapsis_radius.is_nan()
        || periapsis_radius <= 0.0
    {
        return Err(OrbitError::InvalidHyperbola);
    }

    let eccentricity = 1.0 + periapsis_radius * v_inf * v_inf / mu;
    let theta_inf = true_anomaly_at_infinity(eccentricity);

    let v_hat = vector::normalize(v_infinity);
    let h_hat = orbit_normal(&v_hat);

    // outbound asymptote = cos θ∞ p̂ + sin θ∞ q̂ with q̂ = ĥ × p̂
    let (sin_inf, cos_inf) = theta_inf.sin_cos();
    let p_hat = vector::sub(
        &vector::scale(&v_hat, cos_inf),
        &vector::scale(&vector::cross(&h_hat, &v_hat), sin_inf),
    );
    let q_hat = vector::cross(&h_hat, &p_hat);

    let periapsis_speed = (v_inf * v_inf + 2.0 * mu / periapsis_radius).sqrt();
    let periapsis = StateVector {
        position: vector::scale(&p_hat, periapsis_radius),
        velocity: vector::scale(&q_hat, periapsis_speed),
        time: 0.0,
    };

    let elements = elements_from_state_vector(&periapsis, mu)?;
    Ok(elements.with_true_anomaly(0.0))
}

/// State on the outbound leg just short of the asymptote.
pub fn state_near_infinity(
    elements: &KeplerianElements,
    mu: f64,
) -> Result<StateVector, OrbitError> {
    check_mu(mu)?;
    if !elements.is_hyperbolic() {
        return Err(OrbitError::InvalidHyperbola);
    }
    let theta = NEAR_INFINITY_FRACTION * true_anomaly_at_infinity(elements.eccentricity);
    Ok(state_at_true_anomaly(elements, mu, theta))
}

fn orbit_normal(v_hat: &Vector3) -> Vector3 {
    let z_hat = [0.0, 0.0, 1.0];
    let candidate = vector::sub(&z_hat, &vector::scale(v_hat, vector::dot(&z_hat, v_hat)));
    let normal = vector::normalize(&candidate);
    if normal != vector::ZERO {
        return normal;
    }
    let x_hat = [1.0, 0.0, 0.0];
    vector::normalize(&vector::sub(
        &x_hat,
        &vector::scale(v_hat, vector::dot(&x_hat, v_hat)),
    ))
}
