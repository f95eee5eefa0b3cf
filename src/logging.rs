//! Logging setup.
//!
//! Logs go to stderr so JSON on stdout stays clean. The filter comes from
//! `HUNKR_LOG`, then `RUST_LOG`, then the configured default level.

use tracing_subscriber::{fmt, EnvFilter};

fn build_filter(default_level: &str) -> EnvFilter {
    for var in ["HUNKR_LOG", "RUST_LOG"] {
        if let Ok(directives) = std::env::var(var) {
            if let Ok(filter) = EnvFilter::try_new(&directives) {
                return filter;
            }
        }
    }
    EnvFilter::try_new(default_level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init(default_level: &str) {
    let _ = fmt()
        .with_env_filter(build_filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
