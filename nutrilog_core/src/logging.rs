//! Logging infrastructure for nutrilog.
//!
//! Centralized tracing setup shared by every binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with sensible defaults
///
/// Sets up tracing with environment-based filtering (`RUST_LOG`) and a
/// compact format. Default level is WARN so the interactive menus stay
/// readable; raise it with `RUST_LOG` when debugging.
pub fn init() {
    init_with_level("warn")
}

/// Initialize logging with a specific default level
///
/// The level can still be overridden by the `RUST_LOG` environment variable.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}
