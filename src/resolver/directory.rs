//! Postal directory lookup (ViaCEP-compatible API).

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::observability::metrics;
use crate::weather::{PostalCode, UpstreamError};

const SERVICE: &str = "directory";

/// Subset of the directory answer we read.
///
/// Unknown codes come back as `{"erro": true}`, so a missing locality is
/// expected and decodes as empty.
#[derive(Debug, Deserialize)]
pub struct DirectoryLookupResult {
    #[serde(rename = "localidade", default)]
    pub city: String,
}

/// Client for `GET <base>/ws/<code>/json/`.
pub struct DirectoryClient {
    http: Client,
    base_url: Url,
    timeout_secs: u64,
}

impl DirectoryClient {
    pub fn new(http: Client, base_url: Url, timeout_secs: u64) -> Self {
        Self {
            http,
            base_url,
            timeout_secs,
        }
    }

    /// Resolve `code` to a city name.
    pub async fn lookup_city(&self, code: &PostalCode) -> Result<String, UpstreamError> {
        let result = self.fetch(code).await;
        metrics::record_upstream(
            SERVICE,
            result.as_ref().map(|_| "ok").unwrap_or_else(|e| e.outcome()),
        );
        result
    }

    async fn fetch(&self, code: &PostalCode) -> Result<String, UpstreamError> {
        let url = self.lookup_url(code)?;
        tracing::debug!(url = %url, "Querying postal directory");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, self.timeout_secs, e))?;

        if response.status() != StatusCode::OK {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: response.status().as_u16(),
            });
        }

        let payload: DirectoryLookupResult = response
            .json()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, self.timeout_secs, e))?;

        if payload.city.is_empty() {
            return Err(UpstreamError::EmptyLocality);
        }
        Ok(payload.city)
    }

    fn lookup_url(&self, code: &PostalCode) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Transport {
                service: SERVICE,
                message: format!("base URL '{}' cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(["ws", code.as_str(), "json", ""]);
        Ok(url)
    }
}
