//! Transfer façade crate: Lambert arcs between sibling bodies, their hyperbolic legs and the
//! porkchop grid search, with the supporting crates re-exported.

pub mod mission;

pub use facade::*;
pub use kerbol_ephemeris as ephemeris;
pub use kerbol_impulsive as impulsive;
pub use kerbol_orbits as orbits;

mod facade;
