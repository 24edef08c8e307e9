//! Tracing initialisation for the testforge binary.
//!
//! Call [`init_tracing`] once at program start. Later calls are ignored
//! because the global subscriber can only be set once per process.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "TESTFORGE_LOG";

/// Initialise the global tracing subscriber.
///
/// * `json` emits newline-delimited JSON log lines.
/// * `level` is the default verbosity when neither `TESTFORGE_LOG` nor
///   `RUST_LOG` is set.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json().with_writer(std::io::stderr))
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(false, Level::INFO);
        init_tracing(true, Level::DEBUG);
    }
}
