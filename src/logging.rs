//! Logging configuration for neo-explorer.
//!
//! Diagnostics go to stderr so that stdout carries only rendered results.

use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LEVEL: &str = "warn";

/// Builds the filter from `RUST_LOG`, falling back to `default_level`.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initializes logging to stderr.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_stderr_logging(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .try_init();
}
