//! Lambert transfer between two bodies sharing a parent.

use kerbol_core::vector::{self, Vector3};
use kerbol_ephemeris::{BodyId, KerbolSystem, state_at_time};
use kerbol_impulsive::{LambertError, LambertSolution, TransferDirection, hohmann, lambert};
use kerbol_orbits::{KeplerianElements, OrbitError, StateVector, elements_from_state_vector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("{body1} and {body2} do not orbit a common parent")]
    NoCommonParent { body1: BodyId, body2: BodyId },
    #[error("{0} has no orbit to transfer from")]
    NoOrbit(BodyId),
    #[error("transfer from {body1} at t1 = {t1} s is not valid")]
    InvalidTransfer { body1: BodyId, t1: f64 },
    #[error("orbit error: {0}")]
    Orbit(#[from] OrbitError),
}

/// Which end of a transfer arc a quantity refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferEndpoint {
    Departure,
    Arrival,
}

/// Converged Lambert arc around the common parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferArc {
    /// Elements of the arc at the departure epoch.
    pub elements: KeplerianElements,
    pub departure_velocity: Vector3,
    pub arrival_velocity: Vector3,
}

/// Transfer from `body1` at `t1` to `body2` at `t2`.
///
/// `arc` is `None` when the window is inverted or the Lambert solve failed; the body states
/// are populated either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferOrbit {
    pub body1: BodyId,
    pub body2: BodyId,
    pub parent: BodyId,
    pub t1: f64,
    pub t2: f64,
    pub direction: TransferDirection,
    /// `body1` relative to `parent` at `t1`.
    pub departure_state: StateVector,
    /// `body2` relative to `parent` at `t2`.
    pub arrival_state: StateVector,
    pub arc: Option<TransferArc>,
}

impl TransferOrbit {
    pub fn valid(&self) -> bool {
        self.arc.is_some()
    }

    pub fn elements(&self) -> Option<&KeplerianElements> {
        self.arc.as_ref().map(|arc| &arc.elements)
    }

    pub fn time_of_flight(&self) -> f64 {
        self.t2 - self.t1
    }
}

/// Prograde transfer between sibling bodies.
pub fn planetary_transfer(
    system: &KerbolSystem,
    body1: BodyId,
    body2: BodyId,
    t1: f64,
    t2: f64,
) -> Result<TransferOrbit, TransferError> {
    planetary_transfer_with_direction(system, body1, body2, t1, t2, TransferDirection::Prograde)
}

/// Transfer between sibling bodies travelling in `direction` around their parent.
///
/// Bodies without a common parent are rejected. A failed Lambert solve or `t2 <= t1` is not
/// an error; the returned transfer is simply not [`valid`](TransferOrbit::valid).
pub fn planetary_transfer_with_direction(
    system: &KerbolSystem,
    body1: BodyId,
    body2: BodyId,
    t1: f64,
    t2: f64,
    direction: TransferDirection,
) -> Result<TransferOrbit, TransferError> {
    let parent = system
        .common_parent(body1, body2)
        .ok_or(TransferError::NoCommonParent { body1, body2 })?;

    let departure_state = state_at_time(system, t1, parent.id, body1);
    let arrival_state = state_at_time(system, t2, parent.id, body2);

    let arc = match solve_arc(&departure_state, &arrival_state, parent.mu, direction) {
        Ok(arc) => Some(arc),
        Err(err) => {
            warn!(%body1, %body2, t1, t2, error = %err, "transfer arc not found");
            None
        }
    };

    Ok(TransferOrbit {
        body1,
        body2,
        parent: parent.id,
        t1,
        t2,
        direction,
        departure_state,
        arrival_state,
        arc,
    })
}

/// Lambert arc between two parent-relative states, with its elements at departure.
pub(crate) fn solve_arc(
    departure: &StateVector,
    arrival: &StateVector,
    mu: f64,
    direction: TransferDirection,
) -> Result<TransferArc, ArcFailure> {
    let solution = solve_velocities(departure, arrival, mu, direction)?;
    let elements = elements_from_state_vector(
        &StateVector {
            position: departure.position,
            velocity: solution.v1,
            time: departure.time,
        },
        mu,
    )?;
    Ok(TransferArc {
        elements,
        departure_velocity: solution.v1,
        arrival_velocity: solution.v2,
    })
}

/// Terminal velocities of the Lambert arc only; the grid search never needs the elements.
pub(crate) fn solve_velocities(
    departure: &StateVector,
    arrival: &StateVector,
    mu: f64,
    direction: TransferDirection,
) -> Result<LambertSolution, ArcFailure> {
    let dt = arrival.time - departure.time;
    if dt <= 0.0 {
        return Err(ArcFailure::InvertedWindow(dt));
    }
    Ok(lambert::solve(
        departure.position,
        arrival.position,
        dt,
        mu,
        direction,
    )?)
}

/// Reason a single transfer cell has no arc.
#[derive(Debug, Error)]
pub(crate) enum ArcFailure {
    #[error("arrival does not follow departure (dt = {0} s)")]
    InvertedWindow(f64),
    #[error(transparent)]
    Lambert(#[from] LambertError),
    #[error(transparent)]
    Orbit(#[from] OrbitError),
}

/// Hyperbolic excess velocity at one end of a valid transfer.
///
/// Departure uses the arc's initial velocity minus `body1`'s velocity at `t1`; arrival uses
/// the arc's final velocity minus `body2`'s velocity at `t2`.
pub fn excess_velocity(
    transfer: &TransferOrbit,
    endpoint: TransferEndpoint,
) -> Result<Vector3, TransferError> {
    let arc = transfer.arc.as_ref().ok_or(TransferError::InvalidTransfer {
        body1: transfer.body1,
        t1: transfer.t1,
    })?;
    Ok(match endpoint {
        TransferEndpoint::Departure => {
            vector::sub(&arc.departure_velocity, &transfer.departure_state.velocity)
        }
        TransferEndpoint::Arrival => {
            vector::sub(&arc.arrival_velocity, &transfer.arrival_state.velocity)
        }
    })
}

/// Hohmann half-period between the two bodies' semi-major axes, for seeding search windows.
pub fn approximate_time_of_flight(
    system: &KerbolSystem,
    body1: BodyId,
    body2: BodyId,
) -> Result<f64, TransferError> {
    let parent = system
        .common_parent(body1, body2)
        .ok_or(TransferError::NoCommonParent { body1, body2 })?;
    let a1 = system
        .body(body1)
        .orbit
        .ok_or(TransferError::NoOrbit(body1))?
        .semi_major_axis;
    let a2 = system
        .body(body2)
        .orbit
        .ok_or(TransferError::NoOrbit(body2))?
        .semi_major_axis;
    Ok(hohmann(a1, a2, parent.mu).time_of_flight)
}
