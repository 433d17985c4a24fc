//! Impulsive transfer utilities: Lambert solver and classical transfer approximations.

pub mod lambert;
pub mod transfers;

pub use lambert::{LambertError, LambertSolution, TransferDirection, solve as lambert_solve};
pub use transfers::{HohmannResult, hohmann};
