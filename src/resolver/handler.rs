//! `GET /weather?cep=<code>`.

use axum::{
    extract::{Query, State},
    Json,
};
use std::collections::HashMap;
use tracing::{Instrument, Span};

use crate::http::ApiError;
use crate::resolver::ResolverState;
use crate::weather::{PostalCode, WeatherResult};

/// Resolve the code to a city, the city to a temperature, and compose the
/// answer. The first failing stage ends the request.
#[tracing::instrument(name = "getWeatherData", skip_all, fields(cep = tracing::field::Empty))]
pub async fn get_weather_data(
    State(state): State<ResolverState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<WeatherResult>, ApiError> {
    let raw = params.get("cep").map(String::as_str).unwrap_or_default();
    let code = PostalCode::parse(raw)?;
    Span::current().record("cep", code.as_str());

    let city = state
        .directory
        .lookup_city(&code)
        .instrument(tracing::info_span!("fetchCity", otel.kind = "client"))
        .await
        .map_err(ApiError::NotFound)?;

    let temp_c = state
        .weather
        .current_celsius(&city)
        .instrument(tracing::info_span!("fetchTemperature", otel.kind = "client", city = %city))
        .await
        .map_err(|e| ApiError::unavailable("temperature service unavailable", e))?;

    let result = WeatherResult::from_celsius(city, temp_c);
    tracing::info!(city = %result.city, temp_c = result.temp_c, "Weather resolved");
    Ok(Json(result))
}
