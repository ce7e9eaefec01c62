//! CEP weather services.
//!
//! Two services chained over HTTP, with one trace spanning both hops.
//!
//! # Architecture Overview
//!
//! ```text
//!   client                 gateway                     resolver
//!     │  POST /get-weather    │                            │
//!     │ ─────────────────────▶│  GET /weather?cep=         │
//!     │                       │  traceparent: ..           │
//!     │                       │ ──────────────────────────▶│ ── fetchCity ───────▶ postal directory
//!     │                       │                            │ ── fetchTemperature ▶ weather API
//!     │                       │◀────────── WeatherResult ──│
//!     │◀──── WeatherResult ───│                            │
//!
//!   both services ──▶ OTLP collector (spans), stdout (logs), Prometheus (optional)
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cep_weather::config::load_or_default;
use cep_weather::lifecycle::{startup, Shutdown};
use cep_weather::observability::{self, metrics};
use cep_weather::{gateway, resolver};

#[derive(Parser)]
#[command(name = "cep-weather")]
#[command(about = "Postal code to temperature services", version)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    service: Service,
}

#[derive(Subcommand)]
enum Service {
    /// Front service: POST /get-weather
    Gateway {
        /// Override gateway.bind_address
        #[arg(long)]
        bind: Option<String>,
    },
    /// Back service: GET /weather?cep=
    Resolver {
        /// Override resolver.bind_address
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_or_default(cli.config.as_deref())?;

    let service_name = match &cli.service {
        Service::Gateway { bind } => {
            if let Some(bind) = bind {
                config.gateway.bind_address = bind.clone();
            }
            gateway::SERVICE_NAME
        }
        Service::Resolver { bind } => {
            if let Some(bind) = bind {
                config.resolver.bind_address = bind.clone();
            }
            resolver::SERVICE_NAME
        }
    };

    let telemetry = observability::init(service_name, &config.observability)?;
    tracing::info!(
        service = service_name,
        version = env!("CARGO_PKG_VERSION"),
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (server, address) = match cli.service {
        Service::Gateway { .. } => (
            startup::build_gateway(&config, telemetry.propagator()),
            config.gateway.bind_address.clone(),
        ),
        Service::Resolver { .. } => (
            startup::build_resolver(&config, telemetry.propagator())?,
            config.resolver.bind_address.clone(),
        ),
    };
    let listener = startup::bind(&address).await?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let result = server.run(listener, shutdown.subscribe()).await;
    telemetry.shutdown().await;
    result?;

    tracing::info!("Shutdown complete");
    Ok(())
}
