//! Logging setup for the command-line binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary so embedding callers keep control of their own output.

use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable consulted after `RUST_LOG`.
pub const LOG_ENV: &str = "HOSTSWEEP_LOG";

/// Filter directive used when neither environment variable is set.
pub fn default_directive(verbose: bool, quiet: bool) -> String {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    format!("{}={level}", env!("CARGO_CRATE_NAME"))
}

/// Install a stderr subscriber.
///
/// Filter precedence: `RUST_LOG`, then `HOSTSWEEP_LOG`, then the
/// verbosity flags.
pub fn init_logging(verbose: bool, quiet: bool) -> Result<(), tracing_subscriber::util::TryInitError> {
    let directive = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV))
        .unwrap_or_else(|_| default_directive(verbose, quiet));

    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(EnvFilter::new(directive))
        .with(layer)
        .try_init()
}
