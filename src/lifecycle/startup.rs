//! Startup orchestration.
//!
//! # Responsibilities
//! - Build each service from validated configuration
//! - Bind listeners
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners bind last (traffic only when ready)

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::gateway::{self, GatewayState};
use crate::http::HttpServer;
use crate::observability::TracePropagator;
use crate::resolver::{self, ResolverState};

/// Error raised while assembling a service.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid URL in {field}: {source}")]
    Url {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Assemble the front service.
pub fn build_gateway(config: &ServiceConfig, propagator: TracePropagator) -> HttpServer {
    let state = GatewayState::new(&config.gateway, &config.timeouts, propagator.clone());
    HttpServer::new(
        gateway::SERVICE_NAME,
        gateway::routes(state),
        &config.timeouts,
        propagator,
    )
}

/// Assemble the back service.
pub fn build_resolver(
    config: &ServiceConfig,
    propagator: TracePropagator,
) -> Result<HttpServer, StartupError> {
    let state = ResolverState::new(&config.resolver, &config.timeouts)?;
    Ok(HttpServer::new(
        resolver::SERVICE_NAME,
        resolver::routes(state),
        &config.timeouts,
        propagator,
    ))
}

/// Bind a TCP listener on `address`.
pub async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.to_string(),
            source,
        })
}
