//! Tracing setup shared by the typelift binaries.
//!
//! The workflow modules emit structured events keyed by `run_id`; this
//! module wires them to stderr. Initialisation is idempotent because the
//! global subscriber can only be installed once per process.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise `level` is the default
/// verbosity. With `json` the events come out as newline-delimited JSON.
/// Events always go to stderr so piped stdout stays machine-readable.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let format = if json {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init()
        .ok();
}
