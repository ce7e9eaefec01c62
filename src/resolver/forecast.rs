//! Current temperature lookup (WeatherAPI-compatible API).

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::observability::metrics;
use crate::weather::UpstreamError;

const SERVICE: &str = "weather";

/// `temp_c` is required: an answer without it is a decode failure, never 0 °C.
#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temp_c: f64,
}

/// Subset of the weather answer we read.
#[derive(Debug, Deserialize)]
pub struct TemperatureLookupResult {
    current: CurrentConditions,
}

impl TemperatureLookupResult {
    pub fn temp_c(&self) -> f64 {
        self.current.temp_c
    }
}

/// Client for `GET <base>/v1/current.json?key=..&q=<city>`.
pub struct WeatherClient {
    http: Client,
    base_url: Url,
    api_key: String,
    timeout_secs: u64,
}

impl WeatherClient {
    pub fn new(http: Client, base_url: Url, api_key: String, timeout_secs: u64) -> Self {
        Self {
            http,
            base_url,
            api_key,
            timeout_secs,
        }
    }

    /// Current temperature in Celsius for `city`.
    pub async fn current_celsius(&self, city: &str) -> Result<f64, UpstreamError> {
        let result = self.fetch(city).await;
        metrics::record_upstream(
            SERVICE,
            result.as_ref().map(|_| "ok").unwrap_or_else(|e| e.outcome()),
        );
        result
    }

    async fn fetch(&self, city: &str) -> Result<f64, UpstreamError> {
        let url = self.current_url()?;
        // The key is a query parameter; keep it out of the log line.
        tracing::debug!(url = %url, city = %city, "Querying weather API");

        let response = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str()), ("q", city)])
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, self.timeout_secs, e))?;

        if response.status() != StatusCode::OK {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: response.status().as_u16(),
            });
        }

        let payload: TemperatureLookupResult = response
            .json()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, self.timeout_secs, e))?;
        Ok(payload.temp_c())
    }

    fn current_url(&self) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Transport {
                service: SERVICE,
                message: format!("base URL '{}' cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(["v1", "current.json"]);
        Ok(url)
    }
}
