//! Request and response types for the weather chain.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::weather::error::InvalidPostalCode;

/// Number of characters a postal code must have.
pub const POSTAL_CODE_LEN: usize = 8;

/// Body accepted by the gateway.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PostalCodeRequest {
    /// Raw code as sent by the client. A missing field decodes as empty.
    #[serde(rename = "cep", default)]
    pub code: String,
}

/// A postal code that passed the length check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

impl PostalCode {
    /// Validate a raw code. Length is measured in bytes.
    pub fn parse(raw: &str) -> Result<Self, InvalidPostalCode> {
        if raw.len() != POSTAL_CODE_LEN {
            return Err(InvalidPostalCode { length: raw.len() });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composed answer returned by the resolver and relayed by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub city: String,
    #[serde(rename = "temp_C")]
    pub temp_c: f64,
    #[serde(rename = "temp_F")]
    pub temp_f: f64,
    #[serde(rename = "temp_K")]
    pub temp_k: f64,
}

impl WeatherResult {
    /// Build a result from a Celsius reading. The other scales are derived.
    pub fn from_celsius(city: impl Into<String>, temp_c: f64) -> Self {
        Self {
            city: city.into(),
            temp_c,
            temp_f: celsius_to_fahrenheit(temp_c),
            temp_k: celsius_to_kelvin(temp_c),
        }
    }
}

pub fn celsius_to_fahrenheit(temp_c: f64) -> f64 {
    temp_c * 1.8 + 32.0
}

pub fn celsius_to_kelvin(temp_c: f64) -> f64 {
    temp_c + 273.15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_code_length() {
        assert!(PostalCode::parse("01310900").is_ok());
        assert!(PostalCode::parse("0131090").is_err());
        assert!(PostalCode::parse("013109000").is_err());
        assert!(PostalCode::parse("").is_err());

        // Non-digit codes of the right length are left to the directory.
        assert!(PostalCode::parse("abcdefgh").is_ok());

        // "é" is two bytes, so this is nine bytes long.
        let err = PostalCode::parse("0131090é").unwrap_err();
        assert_eq!(err.length, 9);
    }

    #[test]
    fn test_conversions() {
        let result = WeatherResult::from_celsius("São Paulo", 25.0);
        assert!((result.temp_f - 77.0).abs() < 1e-9);
        assert!((result.temp_k - 298.15).abs() < 1e-9);

        assert!((celsius_to_fahrenheit(-40.0) + 40.0).abs() < 1e-9);
        assert!((celsius_to_fahrenheit(0.0) - 32.0).abs() < 1e-9);
        assert!((celsius_to_kelvin(-273.15)).abs() < 1e-9);
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(WeatherResult::from_celsius("Recife", 30.0)).unwrap();
        assert_eq!(json["city"], "Recife");
        assert_eq!(json["temp_C"], 30.0);
        assert!(json.get("temp_F").is_some());
        assert!(json.get("temp_K").is_some());
    }

    #[test]
    fn test_request_missing_field_is_empty() {
        let req: PostalCodeRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.code, "");

        let req: PostalCodeRequest = serde_json::from_str(r#"{"cep":"01310900"}"#).unwrap();
        assert_eq!(req.code, "01310900");

        assert!(serde_json::from_str::<PostalCodeRequest>(r#"{"cep":1310900}"#).is_err());
    }
}
