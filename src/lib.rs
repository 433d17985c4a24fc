//! Ballistic transfer planning for the Kerbol system.
//!
//! The member crates are re-exported under short module names so front-ends (the CLI
//! binaries, notebooks, plotting tools) depend on a single package.

pub use kerbol_config as config;
pub use kerbol_core as core;
pub use kerbol_ephemeris as ephemeris;
pub use kerbol_export as export;
pub use kerbol_impulsive as impulsive;
pub use kerbol_orbits as orbits;
pub use kerbol_transfer as transfer;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
