//! Helpers shared by the command-line binaries.

use anyhow::Context;
use kerbol_trajectory::ephemeris::{Body, KerbolSystem};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install a fmt subscriber on stderr filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Case-insensitive body lookup with a CLI-friendly error.
pub fn find_body<'a>(system: &'a KerbolSystem, name: &str) -> anyhow::Result<&'a Body> {
    system
        .find(name)
        .with_context(|| format!("body '{name}' not found in the Kerbol system"))
}
