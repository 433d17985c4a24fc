//! Impulsive cost of the hyperbolic legs at either end of a transfer.

use kerbol_core::vector::{self, Vector3};
use kerbol_ephemeris::{Body, KerbolSystem};
use kerbol_orbits::{KeplerianElements, fit_hyperbolic_trajectory};

use super::transfer::{TransferEndpoint, TransferError, TransferOrbit, excess_velocity};

/// Burn between a circular orbit of radius `periapsis_radius` and a hyperbola with excess
/// velocity `v_infinity`: `√(v∞² + 2μ/r) − √(μ/r)`.
///
/// The same figure applies to ejection and capture. `periapsis_radius` is measured from the
/// body centre (radius plus altitude); only the magnitude of `v_infinity` matters.
pub fn ejection_capture_dv(body: &Body, v_infinity: &Vector3, periapsis_radius: f64) -> f64 {
    let v_inf = vector::norm(v_infinity);
    let v_circ = (body.mu / periapsis_radius).sqrt();
    let v_periapsis = (v_inf * v_inf + 2.0 * body.mu / periapsis_radius).sqrt();
    v_periapsis - v_circ
}

/// Escape hyperbola around the departure body for a valid transfer, at periapsis at `t1`.
pub fn departure_hyperbola(
    system: &KerbolSystem,
    transfer: &TransferOrbit,
    periapsis_radius: f64,
) -> Result<KeplerianElements, TransferError> {
    let v_inf = excess_velocity(transfer, TransferEndpoint::Departure)?;
    let body = system.body(transfer.body1);
    let elements = fit_hyperbolic_trajectory(&v_inf, periapsis_radius, body.mu)?;
    Ok(KeplerianElements {
        epoch: transfer.t1,
        ..elements
    })
}
