//! Error responses.
//!
//! # Responsibilities
//! - Map request failures to HTTP status codes
//! - Render a short plain-text message for the client
//! - Log the upstream cause once
//!
//! # Design Decisions
//! - No partial results: any error replaces the whole response
//! - Upstream details stay in logs, never in the response body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::weather::{InvalidPostalCode, UpstreamError};

/// Terminal failure of a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body or wrong-length code.
    #[error("invalid zipcode")]
    InvalidInput,

    /// Directory lookup failed.
    #[error("can not find zipcode")]
    NotFound(#[source] UpstreamError),

    /// A dependency could not serve the request. `message` is shown to the client.
    #[error("{message}")]
    UpstreamUnavailable {
        message: &'static str,
        #[source]
        source: UpstreamError,
    },

    /// A dependency answered with malformed JSON.
    #[error("error decoding weather data")]
    Decode(#[source] UpstreamError),
}

impl ApiError {
    pub fn unavailable(message: &'static str, source: UpstreamError) -> Self {
        ApiError::UpstreamUnavailable { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UpstreamUnavailable { .. } | ApiError::Decode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn upstream(&self) -> Option<&UpstreamError> {
        match self {
            ApiError::InvalidInput => None,
            ApiError::NotFound(source)
            | ApiError::UpstreamUnavailable { source, .. }
            | ApiError::Decode(source) => Some(source),
        }
    }
}

impl From<InvalidPostalCode> for ApiError {
    fn from(err: InvalidPostalCode) -> Self {
        tracing::debug!(error = %err, "Rejecting postal code");
        ApiError::InvalidInput
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self.upstream() {
            Some(cause) => tracing::warn!(
                status = status.as_u16(),
                cause = %cause,
                "{}", self
            ),
            None => tracing::debug!(status = status.as_u16(), "{}", self),
        }
        (status, self.to_string()).into_response()
    }
}
