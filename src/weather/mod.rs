//! Weather domain shared by both services.
//!
//! # Data Flow
//! ```text
//! raw "cep" string
//!     → PostalCode::parse (length check, before any outbound call)
//!     → resolver: city lookup → Celsius lookup
//!     → WeatherResult::from_celsius (F and K always derived)
//!     → gateway relays the WeatherResult unchanged
//! ```

pub mod error;
pub mod types;

pub use error::{InvalidPostalCode, UpstreamError};
pub use types::{celsius_to_fahrenheit, celsius_to_kelvin, PostalCode, PostalCodeRequest, WeatherResult};
