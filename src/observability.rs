// src/observability.rs
// Structured logging to the component's stderr, filtered by PDMIUC_LOG.

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "PDMIUC_LOG";

static LOGGING: Lazy<()> = Lazy::new(|| {
    // A subscriber may already be installed (tests, host embedding); that one wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
});

/// Installs the subscriber once per component instance.
pub fn init_logging() {
    Lazy::force(&LOGGING);
}
