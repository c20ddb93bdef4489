//! Logging setup

use tracing_subscriber::EnvFilter;

/// Build the log filter: `RUST_LOG` wins, then the configured filter
pub fn build_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber
///
/// Logs go to stderr so they never interleave with the board on stdout.
pub fn init_logging(configured: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(configured))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
