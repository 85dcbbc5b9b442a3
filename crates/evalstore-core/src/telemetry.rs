//! Log output setup for the `evalstore` binary.
//!
//! The store, migrator and ambient probes only emit `tracing` events (see
//! [`crate::obs`]); nothing is printed unless a subscriber is installed here.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the process-wide subscriber for store and migration events.
///
/// Output goes to stderr: commands such as `show` and `diff --json` print
/// JSON on stdout, and log lines must not interleave with it. `json` switches
/// log lines to newline-delimited JSON. `RUST_LOG` overrides `level`, e.g.
/// `RUST_LOG=evalstore_core=debug` to see store loads and skipped ambient
/// files. Repeated calls are ignored.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init()
            .ok();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_twice_is_harmless() {
        init_tracing(false, Level::INFO);
        init_tracing(true, Level::DEBUG);
        tracing::info!(event = "telemetry.ready");
    }
}
