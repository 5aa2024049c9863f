//! Runtime helpers shared across binaries.
//!
//! Centralizes log setup and environment toggles so CLIs subscribe to the same
//! behavior instead of re-implementing it.

use std::env;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset. Warnings only, so stdout output
/// from the binaries stays the only thing users see on a healthy run.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` raises the crate to `debug`.
/// Calling this twice is harmless; the second install is ignored.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose {
        "warn,listing_catalog=debug"
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Whether an environment flag is set to something other than empty or `0`.
pub fn env_flag(name: &str) -> bool {
    env::var(name)
        .ok()
        .map(|v| !v.trim().is_empty() && v != "0")
        .unwrap_or(false)
}
