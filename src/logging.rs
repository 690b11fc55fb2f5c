//! Diagnostic output.
//!
//! The library only emits `tracing` events; binaries call [`init`] once to
//! print them. Output goes to stderr so command output on stdout stays
//! machine-readable.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG`, when set, overrides `filter`.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
