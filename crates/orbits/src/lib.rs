//! Two-body orbit model: Keplerian elements, state vectors, anomaly solvers and propagation.
//!
//! All routines are pure functions over value types, so they can be called from any
//! number of worker threads without synchronization.

pub mod anomaly;
pub mod conic;
pub mod elements;
pub mod hyperbolic;
pub mod universal;

use thiserror::Error;

pub use conic::{orbital_period, propagate, propagate_many, propagate_to, state_locus};
pub use elements::{
    KeplerianElements, PlanetaryKeplerianElements, StateVector, elements_from_state_vector,
    state_at_true_anomaly, state_vector_from_elements,
};
pub use hyperbolic::{fit_hyperbolic_trajectory, state_near_infinity, true_anomaly_at_infinity};
pub use universal::{propagate_state, propagate_state_many};

/// Errors surfaced by orbit conversions and propagation.
#[derive(Debug, Error, PartialEq)]
pub enum OrbitError {
    #[error("gravitational parameter must be positive and finite (got {0})")]
    InvalidGravitationalParameter(f64),
    #[error("classical propagation requires an elliptical orbit (e = {eccentricity})")]
    NotElliptical { eccentricity: f64 },
    #[error("{solver} solver did not converge within {iterations} iterations")]
    NonConvergence {
        solver: &'static str,
        iterations: usize,
    },
    #[error("orbit locus needs at least two samples (got {0})")]
    InvalidSampleCount(usize),
    #[error("hyperbolic fit requires a non-zero excess velocity and a positive periapsis radius")]
    InvalidHyperbola,
    #[error("state vector has zero position or zero angular momentum")]
    DegenerateState,
}

pub(crate) fn check_mu(mu: f64) -> Result<(), OrbitError> {
    if mu > 0.0 && mu.is_finite() {
        Ok(())
    } else {
        Err(OrbitError::InvalidGravitationalParameter(mu))
    }
}
