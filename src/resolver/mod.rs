//! Back service.
//!
//! # Data Flow
//! ```text
//! GET /weather?cep=..
//!     → handler.rs (length check; 422)
//!     → directory.rs [span fetchCity]        (any failure → 404)
//!     → forecast.rs  [span fetchTemperature] (any failure → 500)
//!     → WeatherResult::from_celsius → 200
//! ```
//!
//! # Design Decisions
//! - One pooled reqwest client shared by both lookups
//! - Upstream base URLs are parsed once at construction

pub mod directory;
pub mod forecast;
pub mod handler;

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::{ResolverConfig, TimeoutConfig};
use crate::lifecycle::StartupError;

pub use directory::DirectoryClient;
pub use forecast::WeatherClient;

/// Service name used in logs, spans and metrics.
pub const SERVICE_NAME: &str = "resolver";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct ResolverState {
    pub directory: Arc<DirectoryClient>,
    pub weather: Arc<WeatherClient>,
}

impl ResolverState {
    pub fn new(config: &ResolverConfig, timeouts: &TimeoutConfig) -> Result<Self, StartupError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.upstream_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .user_agent(concat!("cep-weather/", env!("CARGO_PKG_VERSION")))
            .build()?;

        if config.weather_api_key.is_empty() {
            tracing::warn!("No weather API key configured; temperature lookups will likely fail");
        }

        let directory = DirectoryClient::new(
            http.clone(),
            parse_base("resolver.directory_url", &config.directory_url)?,
            timeouts.upstream_secs,
        );
        let weather = WeatherClient::new(
            http,
            parse_base("resolver.weather_url", &config.weather_url)?,
            config.weather_api_key.clone(),
            timeouts.upstream_secs,
        );

        Ok(Self {
            directory: Arc::new(directory),
            weather: Arc::new(weather),
        })
    }
}

fn parse_base(field: &'static str, value: &str) -> Result<Url, StartupError> {
    Url::parse(value).map_err(|source| StartupError::Url { field, source })
}

/// Resolver routes with state applied.
pub fn routes(state: ResolverState) -> Router {
    Router::new()
        .route("/weather", get(handler::get_weather_data))
        .with_state(state)
}
