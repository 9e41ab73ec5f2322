use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    WeatherError,
    model::{City, ProviderUnits, WeatherReading, WindUnit},
    provider::ProviderId,
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";
const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m";

/// Key-less provider. Conditions are WMO codes; wind is km/h.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch_current(&self, city: &City) -> Result<WeatherReading, WeatherError> {
        let url = format!("{}/v1/forecast", self.base_url);
        tracing::debug!("Open-Meteo request for {} ({}, {})", city, city.latitude, city.longitude);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", city.latitude.to_string()),
                ("longitude", city.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!("Open-Meteo returned status {}", status);
            return Err(WeatherError::http(status, &body));
        }

        let parsed: OmResponse = serde_json::from_str(&body)?;
        Ok(normalize(parsed, city))
    }
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    weather_code: i32,
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current: OmCurrent,
}

fn normalize(payload: OmResponse, city: &City) -> WeatherReading {
    let current = payload.current;
    WeatherReading {
        temperature: current.temperature_2m,
        weather_code: current.weather_code,
        wind_speed: current.wind_speed_10m,
        humidity: current.relative_humidity_2m.round().clamp(0.0, 100.0) as u8,
        city: city.clone(),
        description: None,
        icon: None,
        provider: ProviderId::OpenMeteo,
        wind_unit: WindUnit::KilometresPerHour,
        fetched_at: Utc::now(),
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenMeteo
    }

    fn units(&self) -> ProviderUnits {
        ProviderUnits {
            temperature: "°C",
            wind: WindUnit::KilometresPerHour,
        }
    }

    async fn fetch(&self, city: &City) -> Result<WeatherReading, WeatherError> {
        self.fetch_current(city).await
    }
}
