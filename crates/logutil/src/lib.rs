//! Utilities for logging.

use tracing_subscriber::EnvFilter;

/// Initialize the process-wide tracing subscriber.
///
/// The filter is read from `RUST_LOG`, falling back to `info` when unset.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Initialize logging for tests.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn try_init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
