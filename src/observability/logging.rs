//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber
//! - Choose pretty or JSON output
//! - Attach the OpenTelemetry bridge
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - The level filter applies to log output only. The OpenTelemetry layer has
//!   its own `INFO` floor, so request spans and trace propagation survive a
//!   quiet log level

use opentelemetry_sdk::trace::Tracer;
use tracing::Subscriber;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::observability::TelemetryError;

/// Build the level filter: `RUST_LOG` if set, otherwise the configured level.
pub fn env_filter(config: &ObservabilityConfig) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(&config.log_level)?),
    }
}

/// Assemble the subscriber without installing it.
pub fn subscriber(
    config: &ObservabilityConfig,
    tracer: Tracer,
) -> Result<impl Subscriber + Send + Sync + 'static, TelemetryError> {
    let filter = env_filter(config)?;
    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(filter)
            .boxed(),
    };

    let otel_layer = tracing_opentelemetry::layer()
        .with_tracer(tracer)
        .with_filter(LevelFilter::INFO);

    Ok(tracing_subscriber::registry().with(fmt_layer).with(otel_layer))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn install(config: &ObservabilityConfig, tracer: Tracer) -> Result<(), TelemetryError> {
    subscriber(config, tracer)?.try_init()?;
    Ok(())
}
