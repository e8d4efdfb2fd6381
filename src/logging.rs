//! Tracing subscriber initialization.
//!
//! Diagnostics go to stderr so the sorted output file and shell pipelines
//! stay clean. Verbosity follows `RUST_LOG`, defaulting to `info`.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Calling this more than once is a no-op, so tests that share a process
/// can each call it safely.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
