//! Logging setup
//!
//! `RUST_LOG` wins over the configured level when set.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Default filter directive for a configured level
fn default_directive(level: &str) -> String {
    format!("mirrorhost={},tower_http=info", level)
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(&config.level).into())
}

/// Install the global subscriber
///
/// Fails if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    match config.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
        other => {
            if other != "pretty" {
                eprintln!("Unknown log format {:?}, using pretty", other);
            }
            registry.with(tracing_subscriber::fmt::layer()).try_init()
        }
    }
}
