//! Front service.
//!
//! # Data Flow
//! ```text
//! POST /get-weather {"cep": ".."}
//!     → handler.rs (decode + length check; 422 on failure)
//!     → client.rs (GET resolver /weather?cep=, trace context injected)
//!     → 200 relayed WeatherResult | 500 on any resolver failure
//! ```

pub mod client;
pub mod handler;

use axum::{routing::post, Router};
use std::sync::Arc;

use crate::config::{GatewayConfig, TimeoutConfig};
use crate::observability::TracePropagator;

pub use client::ResolverClient;

/// Service name used in logs, spans and metrics.
pub const SERVICE_NAME: &str = "gateway";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub resolver: Arc<ResolverClient>,
}

impl GatewayState {
    pub fn new(config: &GatewayConfig, timeouts: &TimeoutConfig, propagator: TracePropagator) -> Self {
        Self {
            resolver: Arc::new(ResolverClient::new(&config.resolver_url, timeouts, propagator)),
        }
    }
}

/// Gateway routes with state applied.
pub fn routes(state: GatewayState) -> Router {
    Router::new()
        .route("/get-weather", post(handler::get_weather))
        .with_state(state)
}
