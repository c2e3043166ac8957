//! Logging setup for the binary.
//!
//! Installs a global tracing subscriber writing to stderr, so stdout only
//! carries the final summary. The filter comes from `RUST_LOG` and falls
//! back to `info`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Install the subscriber. Later calls are no-ops.
pub fn init() {
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let subscriber = Registry::default().with(build_env_filter()).with(stderr_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
