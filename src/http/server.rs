//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap a service's routes with the shared middleware stack
//!   (request ID, server span with trace context, timeout, metrics)
//! - Add the `/health` route
//! - Bind server to listener and serve until shutdown

use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::TimeoutConfig;
use crate::http::request::{propagate_request_id, set_request_id};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::observability::tracing::{RecordStatus, ServerSpan, TracePropagator};

/// Liveness answer of `/health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

/// HTTP server for one of the services.
pub struct HttpServer {
    service: &'static str,
    router: Router,
}

impl HttpServer {
    /// Wrap `routes` (state already applied) with the shared middleware.
    pub fn new(
        service: &'static str,
        routes: Router,
        timeouts: &TimeoutConfig,
        propagator: TracePropagator,
    ) -> Self {
        let router = Self::build_router(service, routes, timeouts, propagator);
        Self { service, router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        service: &'static str,
        routes: Router,
        timeouts: &TimeoutConfig,
        propagator: TracePropagator,
    ) -> Router {
        routes
            .route("/health", get(move || health(service)))
            .route_layer(middleware::from_fn_with_state(service, metrics::track_requests))
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id())
                    .layer(
                        TraceLayer::new_for_http()
                            .make_span_with(ServerSpan::new(service, propagator))
                            .on_response(RecordStatus),
                    )
                    .layer(propagate_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(timeouts.request_secs))),
            )
    }

    /// Router with all layers, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown_rx` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            service = self.service,
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!(service = self.service, "HTTP server stopped");
        Ok(())
    }
}

async fn health(service: &'static str) -> Json<HealthStatus> {
    Json(HealthStatus {
        service,
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}
