//! Diagnostic logging bootstrap for the binary.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Env var holding an `EnvFilter` directive; wins over `-v`.
pub const LOG_ENV: &str = "NUDGE_LOG";

/// Default level for a given `-v` count.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a stderr fmt subscriber. A second call is a no-op.
pub fn init_logging(verbosity: u8, color: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(color && std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}
