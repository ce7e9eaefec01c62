//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Both services produce:
//!     → logging.rs (structured log events, pretty or JSON)
//!     → tracing.rs (spans exported over OTLP, W3C context propagation)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → OTLP collector (Jaeger, Tempo, Zipkin via collector)
//!     → Prometheus scrape (optional)
//! ```
//!
//! # Design Decisions
//! - One bootstrap routine shared by both services
//! - The tracer provider is owned by a `Telemetry` value, not installed
//!   globally; the propagator is handed to the services explicitly
//! - Export is optional so tests and local runs need no collector; trace
//!   context still propagates when it is off

pub mod logging;
pub mod metrics;
pub mod tracing;

use opentelemetry_sdk::export::trace::SpanExporter;
use thiserror::Error;

use crate::config::ObservabilityConfig;
pub use self::tracing::{Telemetry, TracePropagator};

/// Error raised while setting up logging or span export.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to build span exporter: {0}")]
    Exporter(String),

    #[error("failed to install subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Initialize logging and span export for `service_name`.
///
/// Must be called once, from inside the tokio runtime, before serving. The
/// returned `Telemetry` must be shut down to flush buffered spans.
pub fn init(service_name: &str, config: &ObservabilityConfig) -> Result<Telemetry, TelemetryError> {
    let telemetry = Telemetry::new(service_name, &config.tracing)?;
    install(service_name, config, telemetry)
}

/// Like [`init`], but finished spans go to `exporter`.
pub fn init_with_exporter<E>(
    service_name: &str,
    config: &ObservabilityConfig,
    exporter: E,
) -> Result<Telemetry, TelemetryError>
where
    E: SpanExporter + 'static,
{
    let telemetry = Telemetry::with_exporter(service_name, &config.tracing, exporter);
    install(service_name, config, telemetry)
}

fn install(
    service_name: &str,
    config: &ObservabilityConfig,
    telemetry: Telemetry,
) -> Result<Telemetry, TelemetryError> {
    logging::install(config, telemetry.tracer())?;

    ::tracing::info!(
        service = service_name,
        span_export = telemetry.is_exporting(),
        "Telemetry initialized"
    );

    Ok(telemetry)
}
