use crate::{
    Config, WeatherError,
    model::{City, ProviderUnits, WeatherReading},
    provider::{openmeteo::OpenMeteoProvider, openweather::OpenWeatherProvider},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt::Debug};

pub mod openmeteo;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenMeteo,
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenMeteo => "openmeteo",
            ProviderId::OpenWeather => "openweather",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenMeteo, ProviderId::OpenWeather]
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderId::OpenWeather)
    }

    /// Name shown to users, e.g. in result footers.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::OpenMeteo => "Open-Meteo",
            ProviderId::OpenWeather => "OpenWeatherMap",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openmeteo" | "open-meteo" => Ok(ProviderId::OpenMeteo),
            "openweather" | "openweathermap" => Ok(ProviderId::OpenWeather),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openmeteo, openweather."
            )),
        }
    }
}

/// A source of current weather for a city.
///
/// Implementations report in their own units (see [`WeatherProvider::units`]);
/// nothing is converted between providers.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    fn units(&self) -> ProviderUnits;

    async fn fetch(&self, city: &City) -> Result<WeatherReading, WeatherError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenMeteo => Box::new(OpenMeteoProvider::new()),
        ProviderId::OpenWeather => {
            let api_key = config.provider_api_key(id).ok_or_else(|| {
                WeatherError::Configuration(format!(
                    "No API key configured for provider '{id}'.\n\
                     Hint: run `weather configure {id}` or set {}.",
                    crate::secrets::API_KEY_ENV
                ))
            })?;
            Box::new(
                OpenWeatherProvider::new(api_key.to_owned()).with_language(config.language()),
            )
        }
    };

    Ok(boxed)
}

/// Construct the default provider from config, falling back to Open-Meteo.
pub fn default_provider_from_config(
    config: &Config,
) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    let id = config
        .default_provider_id()
        .map_err(|e| WeatherError::Configuration(e.to_string()))?
        .unwrap_or(ProviderId::OpenMeteo);
    provider_from_config(id, config)
}
