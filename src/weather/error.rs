//! Errors raised before and during outbound lookups.

use thiserror::Error;

/// The code did not have the required length.
#[derive(Debug, Clone, Error)]
#[error("postal code must be 8 characters, got {length}")]
pub struct InvalidPostalCode {
    pub length: usize,
}

/// Failure of a single outbound call.
///
/// `service` names the dependency ("resolver", "directory", "weather") so the
/// log line says which hop broke.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection or protocol failure before a response arrived.
    #[error("request to {service} failed: {message}")]
    Transport { service: &'static str, message: String },

    /// No complete response within the upstream timeout.
    #[error("request to {service} timed out after {secs}s")]
    Timeout { service: &'static str, secs: u64 },

    /// Response arrived with an unexpected status.
    #[error("{service} returned status {status}")]
    Status { service: &'static str, status: u16 },

    /// Response body was not the expected JSON shape.
    #[error("{service} returned an undecodable body: {message}")]
    Decode { service: &'static str, message: String },

    /// Directory answered but carried no locality for the code.
    #[error("directory has no locality for the postal code")]
    EmptyLocality,
}

impl UpstreamError {
    pub fn is_decode(&self) -> bool {
        matches!(self, UpstreamError::Decode { .. })
    }

    /// Short label used for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            UpstreamError::Transport { .. } => "transport_error",
            UpstreamError::Timeout { .. } => "timeout",
            UpstreamError::Status { .. } => "bad_status",
            UpstreamError::Decode { .. } => "decode_error",
            UpstreamError::EmptyLocality => "empty_locality",
        }
    }

    /// Classify a reqwest failure.
    pub fn from_reqwest(service: &'static str, timeout_secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout { service, secs: timeout_secs }
        } else if err.is_decode() {
            UpstreamError::Decode { service, message: err.to_string() }
        } else {
            UpstreamError::Transport { service, message: err.to_string() }
        }
    }
}
