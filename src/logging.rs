//! Logging setup for the harness binary.
//!
//! Events go to stderr so the result table on stdout stays clean. `RUST_LOG`
//! takes precedence over the `-v` count.

use std::sync::OnceLock;

use tracing::debug;
use tracing_subscriber::EnvFilter;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Maps the `-v` count to a default filter directive.
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_logging(verbose: u8) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
        if let Err(err) = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
        {
            debug!(%err, "keeping the subscriber that is already installed");
        }
    });
}
