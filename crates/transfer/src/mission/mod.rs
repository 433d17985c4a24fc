//! Patched-conic mission estimator: heliocentric (or planetocentric) Lambert arc between two
//! sibling bodies, the hyperbolic legs at either end, and the porkchop grid search over
//! departure time and time of flight.

pub mod delta_v;
pub mod porkchop;
pub mod transfer;
