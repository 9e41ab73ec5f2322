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

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";
pub const DEFAULT_LANGUAGE: &str = "zh_cn";

/// Key-gated provider. Conditions are OpenWeatherMap ids; wind is m/s.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    language: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            language: DEFAULT_LANGUAGE.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Language for the condition description (`lang` query parameter).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    async fn fetch_current(&self, city: &City) -> Result<WeatherReading, WeatherError> {
        if self.api_key.trim().is_empty() {
            return Err(WeatherError::Configuration(
                "OpenWeatherMap API key is not set".to_string(),
            ));
        }

        let url = format!("{}/data/2.5/weather", self.base_url);
        tracing::debug!(
            "OpenWeatherMap request for {} ({}, {})",
            city,
            city.latitude,
            city.longitude
        );

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", city.latitude.to_string()),
                ("lon", city.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
                ("lang", self.language.clone()),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.without_url()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::Network(e.without_url()))?;

        if !status.is_success() {
            tracing::debug!("OpenWeatherMap returned status {}", status);
            return Err(WeatherError::http(status, &body));
        }

        let parsed: OwResponse = serde_json::from_str(&body)?;
        normalize(parsed, city)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i32,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

fn normalize(payload: OwResponse, city: &City) -> Result<WeatherReading, WeatherError> {
    let condition = payload.weather.into_iter().next().ok_or_else(|| {
        WeatherError::Parse("OpenWeatherMap response contained no weather entry".to_string())
    })?;

    Ok(WeatherReading {
        temperature: payload.main.temp,
        weather_code: condition.id,
        wind_speed: payload.wind.speed,
        humidity: payload.main.humidity,
        city: city.clone(),
        description: Some(condition.description),
        icon: Some(icon_url(&condition.icon)),
        provider: ProviderId::OpenWeather,
        wind_unit: WindUnit::MetresPerSecond,
        fetched_at: Utc::now(),
    })
}

fn icon_url(icon: &str) -> String {
    format!("{ICON_BASE_URL}/{icon}@2x.png")
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    fn units(&self) -> ProviderUnits {
        ProviderUnits {
            temperature: "°C",
            wind: WindUnit::MetresPerSecond,
        }
    }

    async fn fetch(&self, city: &City) -> Result<WeatherReading, WeatherError> {
        self.fetch_current(city).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> City {
        City::new("巴黎", "法国", 48.8566, 2.3522)
    }

    #[test]
    fn normalize_takes_first_condition() {
        let payload: OwResponse = serde_json::from_str(
            r#"{"name":"Paris","main":{"temp":14.2,"feels_like":13.0,"humidity":81},
                "weather":[{"id":500,"main":"Rain","description":"小雨","icon":"10d"},
                           {"id":701,"main":"Mist","description":"薄雾","icon":"50d"}],
                "wind":{"speed":4.1,"deg":200}}"#,
        )
        .unwrap();

        let reading = normalize(payload, &paris()).unwrap();
        assert_eq!(reading.temperature, 14.2);
        assert_eq!(reading.weather_code, 500);
        assert_eq!(reading.humidity, 81);
        assert_eq!(reading.wind_speed, 4.1);
        assert_eq!(reading.wind_unit, WindUnit::MetresPerSecond);
        assert_eq!(reading.description.as_deref(), Some("小雨"));
        assert_eq!(
            reading.icon.as_deref(),
            Some("https://openweathermap.org/img/wn/10d@2x.png")
        );
    }

    #[test]
    fn empty_weather_array_is_a_parse_error() {
        let payload: OwResponse = serde_json::from_str(
            r#"{"main":{"temp":1.0,"humidity":10},"weather":[],"wind":{"speed":0.0}}"#,
        )
        .unwrap();

        let err = normalize(payload, &paris()).unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[tokio::test]
    async fn blank_key_is_a_configuration_error() {
        let provider = OpenWeatherProvider::new("  ".to_string());
        let err = provider.fetch(&paris()).await.unwrap_err();
        assert!(matches!(err, WeatherError::Configuration(_)));
    }
}
