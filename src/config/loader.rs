//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the weather API credential.
pub const WEATHER_API_KEY_ENV: &str = "WEATHER_API_KEY";
/// Standard OpenTelemetry variable for the collector endpoint.
pub const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
/// Overrides `gateway.resolver_url`.
pub const RESOLVER_URL_ENV: &str = "RESOLVER_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text, applying process
/// environment overrides.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let mut config: ServiceConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load from `path` when given, otherwise start from defaults. Environment
/// overrides apply in both cases.
pub fn load_or_default(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => parse_config(""),
    }
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(WEATHER_API_KEY_ENV) {
        config.resolver.weather_api_key = key;
    }
    if let Some(endpoint) = lookup(OTLP_ENDPOINT_ENV).filter(|v| !v.is_empty()) {
        config.observability.tracing.otlp_endpoint = traces_endpoint(&endpoint);
    }
    if let Some(url) = lookup(RESOLVER_URL_ENV).filter(|v| !v.is_empty()) {
        config.gateway.resolver_url = url;
    }
}

/// `OTEL_EXPORTER_OTLP_ENDPOINT` is a base URL; the traces signal lives
/// under `/v1/traces`.
fn traces_endpoint(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/v1/traces") {
        base.to_string()
    } else {
        format!("{}/v1/traces", base)
    }
}
