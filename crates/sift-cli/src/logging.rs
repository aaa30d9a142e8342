//! Diagnostic logging to stderr.

use tracing::debug;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "SIFT_LOG";

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize tracing from `SIFT_LOG`, falling back to the `-v` count.
pub fn init(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = level_for(verbose);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    debug!("Logging initialized at level: {}", level);
}
