use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::config::{EventsConfig, LoggingConfig};

/// Build the level filter. `RUST_LOG` wins over the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Initialize the global tracing subscriber
pub fn init(config: &LoggingConfig) -> Result<()> {
    let fmt_layer = if config.json {
        // JSON formatting for structured logs
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer().compact().with_target(true).boxed()
    };

    Registry::default()
        .with(env_filter(config))
        .with(fmt_layer)
        .try_init()?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        json = config.json,
        "Logging initialized"
    );

    Ok(())
}

/// Log the effective configuration
pub fn log_config(config: &EventsConfig) {
    tracing::info!(
        failure_policy = ?config.failure_policy,
        log_level = %config.logging.level,
        json = config.logging.json,
        "Event configuration loaded"
    );
}
