//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and upstream URLs
//! - Validate value ranges (timeouts > 0, sample ratio)
//! - Outbound timeout shorter than the inbound one
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;
use url::Url;

use crate::config::schema::ServiceConfig;

/// One invalid configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "gateway.bind_address", &config.gateway.bind_address);
    check_socket_addr(&mut errors, "resolver.bind_address", &config.resolver.bind_address);

    // The gateway forwards over a plain HTTP connector.
    check_url(&mut errors, "gateway.resolver_url", &config.gateway.resolver_url, &["http"]);
    check_url(&mut errors, "resolver.directory_url", &config.resolver.directory_url, &["http", "https"]);
    check_url(&mut errors, "resolver.weather_url", &config.resolver.weather_url, &["http", "https"]);

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be greater than 0"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    // An outbound call must give up before the inbound request does, so a
    // slow dependency surfaces as that dependency's failure.
    if config.timeouts.upstream_secs > 0 && config.timeouts.upstream_secs >= config.timeouts.request_secs {
        errors.push(ValidationError::new(
            "timeouts.upstream_secs",
            format!(
                "must be less than timeouts.request_secs ({}), got {}",
                config.timeouts.request_secs, config.timeouts.upstream_secs
            ),
        ));
    }

    let obs = &config.observability;
    if obs.log_level.trim().is_empty() {
        errors.push(ValidationError::new("observability.log_level", "must not be empty"));
    }
    if obs.metrics_enabled {
        check_socket_addr(&mut errors, "observability.metrics_address", &obs.metrics_address);
    }
    if obs.tracing.enabled {
        check_url(
            &mut errors,
            "observability.tracing.otlp_endpoint",
            &obs.tracing.otlp_endpoint,
            &["http", "https"],
        );
    }
    if !(0.0..=1.0).contains(&obs.tracing.sample_ratio) {
        errors.push(ValidationError::new(
            "observability.tracing.sample_ratio",
            format!("must be within [0, 1], got {}", obs.tracing.sample_ratio),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("'{}' is not a socket address", value)));
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str, schemes: &[&str]) {
    match Url::parse(value) {
        Ok(url) if !schemes.contains(&url.scheme()) => errors.push(ValidationError::new(
            field,
            format!("scheme '{}' not allowed, expected one of {:?}", url.scheme(), schemes),
        )),
        Ok(url) if url.cannot_be_a_base() || url.host().is_none() => {
            errors.push(ValidationError::new(field, format!("'{}' has no host", value)))
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new(field, format!("'{}' is not a URL: {}", value, e))),
    }
}
