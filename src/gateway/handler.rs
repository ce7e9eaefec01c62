//! `POST /get-weather`.

use axum::{body::Bytes, extract::State, Json};
use tracing::Span;

use crate::gateway::GatewayState;
use crate::http::ApiError;
use crate::weather::{PostalCode, PostalCodeRequest, WeatherResult};

/// Validate the body, delegate to the resolver and relay its answer.
///
/// The body is decoded as JSON whatever its content type; a body that does
/// not decode is treated like a bad code.
#[tracing::instrument(name = "getWeather", skip_all, fields(cep = tracing::field::Empty))]
pub async fn get_weather(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Json<WeatherResult>, ApiError> {
    let request: PostalCodeRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejecting undecodable body");
        ApiError::InvalidInput
    })?;
    let code = PostalCode::parse(&request.code)?;
    Span::current().record("cep", code.as_str());

    let weather = state.resolver.fetch_weather(&code).await.map_err(|e| {
        if e.is_decode() {
            ApiError::Decode(e)
        } else {
            ApiError::unavailable("error fetching weather", e)
        }
    })?;

    tracing::info!(city = %weather.city, temp_c = weather.temp_c, "Weather relayed");
    Ok(Json(weather))
}
