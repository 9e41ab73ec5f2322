//! Core library for the `weather` lookup tool.
//!
//! This crate defines:
//! - The city catalog and its search/random helpers
//! - WMO weather code descriptions
//! - Two weather providers behind one trait (Open-Meteo, OpenWeatherMap)
//! - Configuration, credentials and the API key payload
//! - Session state that keeps the view tied to the latest lookup
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod catalog;
pub mod codes;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod secrets;
pub mod session;

pub use catalog::{CityCatalog, default_cities, find, pick_random, search};
pub use codes::{UNKNOWN_CODE, WeatherCodeEntry, describe_code};
pub use config::{Config, ProviderConfig};
pub use error::WeatherError;
pub use model::{City, ProviderUnits, WeatherReading, WindUnit};
pub use provider::{
    ProviderId, WeatherProvider, default_provider_from_config,
    openmeteo::OpenMeteoProvider, openweather::OpenWeatherProvider, provider_from_config,
};
pub use secrets::{API_KEY_ENV, ApiKeyPayload, fetch_api_key};
pub use session::{RequestToken, Session, ViewState};
