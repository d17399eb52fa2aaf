//! Tracing subscriber setup
//!
//! Logs always go to stderr: the `worker` subcommand owns stdout for the
//! protocol and the record command prints the output path there.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "mp3_recorder=debug"
    } else {
        "mp3_recorder=warn"
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
