//! Outbound client for the resolver hop.
//!
//! # Responsibilities
//! - Build `GET <resolver>/weather?cep=<code>`
//! - Inject the current trace context into the request headers
//! - Bound the call with the upstream timeout
//! - Decode the answer as a `WeatherResult`

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::Duration;
use tracing::Span;

use crate::config::TimeoutConfig;
use crate::observability::{metrics, TracePropagator};
use crate::weather::{PostalCode, UpstreamError, WeatherResult};

const SERVICE: &str = "resolver";

/// Upper bound on a resolver answer.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// HTTP client for the resolver.
pub struct ResolverClient {
    client: Client<HttpConnector, Body>,
    base_url: String,
    timeout_secs: u64,
    propagator: TracePropagator,
}

impl ResolverClient {
    pub fn new(base_url: &str, timeouts: &TimeoutConfig, propagator: TracePropagator) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: timeouts.upstream_secs,
            propagator,
        }
    }

    /// Ask the resolver for the weather at `code`. Any status other than
    /// 200 is a failure.
    pub async fn fetch_weather(&self, code: &PostalCode) -> Result<WeatherResult, UpstreamError> {
        let timeout = Duration::from_secs(self.timeout_secs);
        let result = match tokio::time::timeout(timeout, self.send(code)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout {
                service: SERVICE,
                secs: self.timeout_secs,
            }),
        };

        metrics::record_upstream(
            SERVICE,
            result.as_ref().map(|_| "ok").unwrap_or_else(|e| e.outcome()),
        );
        result
    }

    async fn send(&self, code: &PostalCode) -> Result<WeatherResult, UpstreamError> {
        let encoded: String = url::form_urlencoded::byte_serialize(code.as_str().as_bytes()).collect();
        let uri = format!("{}/weather?cep={}", self.base_url, encoded);

        let mut request = Request::builder()
            .method(Method::GET)
            .uri(uri.as_str())
            .body(Body::empty())
            .map_err(|e| transport(e.to_string()))?;
        self.propagator.inject(&Span::current(), request.headers_mut());

        tracing::debug!(uri = %uri, "Forwarding to resolver");

        let response: Response<Incoming> = self
            .client
            .request(request)
            .await
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let body = axum::body::to_bytes(Body::new(response.into_body()), MAX_BODY_BYTES)
            .await
            .map_err(|e| transport(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })
    }
}

fn transport(message: String) -> UpstreamError {
    UpstreamError::Transport {
        service: SERVICE,
        message,
    }
}
