//! Tracing setup shared by the `mplan` binary and the unit tests.
//!
//! Filtering comes from `MICROPLAN_LOG`, then `RUST_LOG`, then the level
//! passed in. Output always goes to stderr; stdout belongs to commands.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Env var checked before `RUST_LOG`
pub const LOG_ENV: &str = "MICROPLAN_LOG";

/// Install the subscriber at `info`
pub fn init() {
    init_with_level("info")
}

pub fn init_with_level(default_level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter_for(default_level))
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

fn filter_for(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Debug-level logs routed through the test harness
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
