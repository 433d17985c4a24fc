//! Universal-variable propagation valid for every conic section.

use kerbol_core::stumpff;
use kerbol_core::vector;

use crate::anomaly::{UniversalProblem, universal_anomaly};
use crate::elements::StateVector;
use crate::{OrbitError, check_mu};

/// Propagate `state` to the absolute epoch `t` using the Lagrange coefficients.
pub fn propagate_state(state: &StateVector, t: f64, mu: f64) -> Result<StateVector, OrbitError> {
    check_mu(mu)?;

    let dt = t - state.time;
    let r0_vec = &state.position;
    let v0_vec = &state.velocity;
    let r0 = vector::norm(r0_vec);
    if r0 == 0.0 {
        return Err(OrbitError::DegenerateState);
    }
    if dt == 0.0 {
        return Ok(StateVector { time: t, ..*state });
    }

    let v0 = vector::norm(v0_vec);
    let vr0 = vector::dot(r0_vec, v0_vec) / r0;
    let alpha = 2.0 / r0 - v0 * v0 / mu;

    let problem = UniversalProblem { r0, vr0, alpha, mu };
    let chi = universal_anomaly(&problem, dt)?;

    let chi2 = chi * chi;
    let z = alpha * chi2;
    let (c, s) = stumpff::c_and_s(z);
    let sqrt_mu = mu.sqrt();

    let f = 1.0 - chi2 / r0 * c;
    let g = dt - chi2 * chi / sqrt_mu * s;
    let r_vec = vector::add(&vector::scale(r0_vec, f), &vector::scale(v0_vec, g));
    let r = vector::norm(&r_vec);

    let f_dot = sqrt_mu / (r * r0) * (z * s - 1.0) * chi;
    let g_dot = 1.0 - chi2 / r * c;
    let v_vec = vector::add(
        &vector::scale(r0_vec, f_dot),
        &vector::scale(v0_vec, g_dot),
    );

    Ok(StateVector {
        position: r_vec,
        velocity: v_vec,
        time: t,
    })
}

/// Propagate `state` independently to each absolute epoch in `times`.
pub fn propagate_state_many(
    state: &StateVector,
    times: &[f64],
    mu: f64,
) -> Result<Vec<StateVector>, OrbitError> {
    times.iter().map(|&t| propagate_state(state, t, mu)).collect()
}
