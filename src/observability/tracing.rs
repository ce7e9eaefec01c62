//! Distributed tracing support.
//!
//! # Responsibilities
//! - Build the OTLP span pipeline for one service
//! - Extract trace context from incoming requests
//! - Propagate trace context to outbound requests
//! - Create the per-request server span
//!
//! # Design Decisions
//! - Supports W3C Trace Context headers (`traceparent`, `tracestate`)
//! - Spans are ordinary `tracing` spans bridged by `tracing-opentelemetry`,
//!   so they close on every exit path
//! - Export can be disabled; spans and propagation keep working without it

use axum::http::{HeaderMap, Request, Response};
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{Context, KeyValue};
use opentelemetry_http::{HeaderExtractor, HeaderInjector};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::export::trace::SpanExporter;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{Builder, Sampler, Tracer, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};
use std::time::Duration;
use tower_http::trace::{MakeSpan, OnResponse};
use tracing::{field, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::config::TracingConfig;
use crate::observability::TelemetryError;

/// Owns the tracer provider of one service.
pub struct Telemetry {
    provider: TracerProvider,
    tracer: Tracer,
    propagator: TracePropagator,
    exporting: bool,
}

impl Telemetry {
    /// Build the span pipeline. No exporter is attached when export is
    /// disabled, but spans still carry trace context.
    pub fn new(service_name: &str, config: &TracingConfig) -> Result<Self, TelemetryError> {
        let mut builder = provider_builder(service_name, config);
        if config.enabled {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_http()
                .with_endpoint(config.otlp_endpoint.clone())
                .build()
                .map_err(|e| TelemetryError::Exporter(e.to_string()))?;
            builder = builder.with_batch_exporter(exporter, runtime::Tokio);
        }
        Ok(Self::from_provider(service_name, builder.build(), config.enabled))
    }

    /// Send every finished span straight to `exporter`, ignoring the
    /// configured collector. Sampling still follows `config`.
    pub fn with_exporter<E>(service_name: &str, config: &TracingConfig, exporter: E) -> Self
    where
        E: SpanExporter + 'static,
    {
        let provider = provider_builder(service_name, config)
            .with_simple_exporter(exporter)
            .build();
        Self::from_provider(service_name, provider, true)
    }

    fn from_provider(service_name: &str, provider: TracerProvider, exporting: bool) -> Self {
        let tracer = provider.tracer(service_name.to_string());
        Self {
            provider,
            tracer,
            propagator: TracePropagator::new(),
            exporting,
        }
    }

    /// Tracer to bridge `tracing` spans into.
    pub fn tracer(&self) -> Tracer {
        self.tracer.clone()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn propagator(&self) -> TracePropagator {
        self.propagator.clone()
    }

    /// Flush buffered spans and stop the exporter.
    pub async fn shutdown(self) {
        if !self.exporting {
            return;
        }

        // The batch processor blocks while flushing.
        let provider = self.provider;
        match tokio::task::spawn_blocking(move || provider.shutdown()).await {
            Ok(Ok(())) => tracing::info!("Span exporter flushed"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed to shut down tracer provider"),
            Err(e) => tracing::warn!(error = %e, "Tracer shutdown task failed"),
        }
    }
}

fn provider_builder(service_name: &str, config: &TracingConfig) -> Builder {
    let root_sampler = if config.sample_ratio >= 1.0 {
        Sampler::AlwaysOn
    } else {
        Sampler::TraceIdRatioBased(config.sample_ratio)
    };

    TracerProvider::builder()
        .with_sampler(Sampler::ParentBased(Box::new(root_sampler)))
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            service_name.to_string(),
        )]))
}

/// W3C trace context propagation over HTTP headers.
#[derive(Clone)]
pub struct TracePropagator {
    inner: TraceContextPropagator,
}

impl TracePropagator {
    pub fn new() -> Self {
        Self {
            inner: TraceContextPropagator::new(),
        }
    }

    /// Read the remote parent context from request headers. Missing or
    /// malformed headers give an empty context.
    pub fn extract(&self, headers: &HeaderMap) -> Context {
        self.inner.extract(&HeaderExtractor(headers))
    }

    pub fn inject_context(&self, cx: &Context, headers: &mut HeaderMap) {
        self.inner.inject_context(cx, &mut HeaderInjector(headers));
    }

    /// Write the context of `span` into outbound headers.
    pub fn inject(&self, span: &Span, headers: &mut HeaderMap) {
        self.inject_context(&span.context(), headers);
    }
}

impl Default for TracePropagator {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates the server span of each request, parented to the caller's trace.
#[derive(Clone)]
pub struct ServerSpan {
    service: &'static str,
    propagator: TracePropagator,
}

impl ServerSpan {
    pub fn new(service: &'static str, propagator: TracePropagator) -> Self {
        Self { service, propagator }
    }
}

impl<B> MakeSpan<B> for ServerSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");

        let span = tracing::info_span!(
            "request",
            service = self.service,
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
            otel.kind = "server",
            otel.status_code = field::Empty,
            http.status_code = field::Empty,
        );
        span.set_parent(self.propagator.extract(request.headers()));
        span
    }
}

/// Records the response status on the server span.
#[derive(Clone, Copy, Default)]
pub struct RecordStatus;

impl<B> OnResponse<B> for RecordStatus {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        let status = response.status();
        span.record("http.status_code", status.as_u16());
        if status.is_server_error() || status.is_client_error() {
            span.record("otel.status_code", "ERROR");
        }
        tracing::debug!(
            status = status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            "Finished request"
        );
    }
}
