//! Analytic ephemeris for the Kerbol system.
//!
//! Every body follows a fixed Keplerian orbit around its parent. A body's state relative
//! to any other body is obtained by walking the parent chain and summing the per-level
//! states, so evaluation is a pure function of the universal time.

use std::sync::OnceLock;

use kerbol_core::vector::Vector3;
use kerbol_orbits::{OrbitError, StateVector, state_locus, state_vector_from_elements};
use thiserror::Error;

pub mod bodies;

pub use bodies::{Body, BodyId};

use bodies::BODY_TABLE;

/// Errors surfaced by body lookups and ephemeris queries.
#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("invalid identifier `{0}`: not a body of the Kerbol system")]
    UnknownBody(String),
    #[error("body table entry {index} is {found}, expected {expected}")]
    MisorderedTable {
        index: usize,
        expected: BodyId,
        found: BodyId,
    },
    #[error("body table lists {0} bodies, expected 17")]
    IncompleteTable(usize),
    #[error("body table must contain exactly one root body (found {0})")]
    InvalidRoot(usize),
    #[error("parent chain of {0} does not terminate at the root")]
    CyclicHierarchy(BodyId),
    #[error("{0} has no orbit (root body)")]
    NoOrbit(BodyId),
    #[error(transparent)]
    Orbit(#[from] OrbitError),
}

/// Immutable body hierarchy indexed by [`BodyId`].
#[derive(Debug, Clone)]
pub struct KerbolSystem {
    bodies: Vec<Body>,
    root: BodyId,
}

static STANDARD_SYSTEM: OnceLock<KerbolSystem> = OnceLock::new();

impl KerbolSystem {
    /// The stock Kerbol system, built on first use and shared for the process lifetime.
    ///
    /// # Panics
    ///
    /// Panics if the built-in table violates the hierarchy invariants.
    pub fn standard() -> &'static KerbolSystem {
        STANDARD_SYSTEM.get_or_init(|| {
            let bodies = BODY_TABLE.iter().map(|record| record.to_body()).collect();
            KerbolSystem::from_bodies(bodies)
                .unwrap_or_else(|err| panic!("built-in body table is invalid: {err}"))
        })
    }

    /// Build a system from bodies listed in [`BodyId::ALL`] order.
    ///
    /// Exactly one body may lack a parent, and every parent chain must reach it.
    pub fn from_bodies(bodies: Vec<Body>) -> Result<Self, EphemerisError> {
        for (index, (body, expected)) in bodies.iter().zip(BodyId::ALL).enumerate() {
            if body.id != expected {
                return Err(EphemerisError::MisorderedTable {
                    index,
                    expected,
                    found: body.id,
                });
            }
        }
        if bodies.len() != BodyId::ALL.len() {
            return Err(EphemerisError::IncompleteTable(bodies.len()));
        }

        let roots: Vec<BodyId> = bodies
            .iter()
            .filter(|b| b.parent.is_none())
            .map(|b| b.id)
            .collect();
        let &[root] = roots.as_slice() else {
            return Err(EphemerisError::InvalidRoot(roots.len()));
        };

        let system = Self { bodies, root };
        for id in BodyId::ALL {
            if system.depth(id).is_none() {
                return Err(EphemerisError::CyclicHierarchy(id));
            }
        }
        Ok(system)
    }

    pub fn root(&self) -> BodyId {
        self.root
    }

    pub fn body(&self, id: BodyId) -> &Body {
        &self.bodies[id.index()]
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Case-insensitive lookup by name.
    pub fn find(&self, name: &str) -> Result<&Body, EphemerisError> {
        Ok(self.body(name.parse()?))
    }

    pub fn parent(&self, id: BodyId) -> Option<&Body> {
        self.body(id).parent.map(|p| self.body(p))
    }

    /// Bodies orbiting `id` directly, in table order.
    pub fn children(&self, id: BodyId) -> Vec<&Body> {
        self.bodies
            .iter()
            .filter(|b| b.parent == Some(id))
            .collect()
    }

    /// Shared parent of two bodies, if they orbit the same body.
    pub fn common_parent(&self, a: BodyId, b: BodyId) -> Option<&Body> {
        match (self.body(a).parent, self.body(b).parent) {
            (Some(pa), Some(pb)) if pa == pb => Some(self.body(pa)),
            _ => None,
        }
    }

    /// Number of parent links between `id` and the root, or `None` on a cycle.
    fn depth(&self, id: BodyId) -> Option<usize> {
        let mut current = id;
        for depth in 0..=self.bodies.len() {
            match self.body(current).parent {
                None => return Some(depth),
                Some(parent) => current = parent,
            }
        }
        None
    }
}

/// State of `id` relative to its immediate parent at time `t`; zero for the root.
pub fn direct_state(system: &KerbolSystem, id: BodyId, t: f64) -> StateVector {
    let body = system.body(id);
    match (body.orbit, system.parent(id)) {
        (Some(orbit), Some(parent)) => {
            let elements = orbit.at_time(t, parent.mu);
            state_vector_from_elements(&elements, parent.mu)
        }
        _ => StateVector::zero(t),
    }
}

/// State of `id` relative to the root at time `t`.
pub fn absolute_state(system: &KerbolSystem, id: BodyId, t: f64) -> StateVector {
    let mut state = StateVector::zero(t);
    let mut current = Some(id);
    // hierarchy depth is bounded by the body count, checked at construction
    while let Some(body) = current {
        state = state.offset_by(&direct_state(system, body, t));
        current = system.body(body).parent;
    }
    state
}

/// State of `target` as seen from `observer` at universal time `t`.
///
/// When `observer` is an ancestor of `target` the per-level states are summed up to it;
/// otherwise both bodies are resolved against the root and differenced.
pub fn state_at_time(
    system: &KerbolSystem,
    t: f64,
    observer: BodyId,
    target: BodyId,
) -> StateVector {
    if observer == target {
        return StateVector::zero(t);
    }

    let mut state = StateVector::zero(t);
    let mut current = target;
    while let Some(parent) = system.body(current).parent {
        state = state.offset_by(&direct_state(system, current, t));
        if parent == observer {
            return state;
        }
        current = parent;
    }

    absolute_state(system, target, t).relative_to(&absolute_state(system, observer, t))
}

/// [`state_at_time`] evaluated at each time in `times`.
pub fn states_at_times(
    system: &KerbolSystem,
    times: &[f64],
    observer: BodyId,
    target: BodyId,
) -> Vec<StateVector> {
    times
        .iter()
        .map(|&t| state_at_time(system, t, observer, target))
        .collect()
}

/// `samples` points along the orbit of `id` around its parent.
pub fn orbit_locus(
    system: &KerbolSystem,
    id: BodyId,
    samples: usize,
) -> Result<Vec<Vector3>, EphemerisError> {
    let body = system.body(id);
    let (Some(orbit), Some(parent)) = (body.orbit, system.parent(id)) else {
        return Err(EphemerisError::NoOrbit(id));
    };
    let elements = orbit.at_time(0.0, parent.mu);
    Ok(state_locus(&elements, parent.mu, samples)?)
}
