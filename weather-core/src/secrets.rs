//! The OpenWeatherMap API key, as served to front ends.
//!
//! The payload is either `{"apiKey": "..."}` or `{"error": "..."}`.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Config, WeatherError, provider::ProviderId};

pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

const KEY_UNSET_MESSAGE: &str = "API密钥未设置";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiKeyPayload {
    Key {
        #[serde(rename = "apiKey")]
        api_key: String,
    },
    Error {
        error: String,
    },
}

impl ApiKeyPayload {
    /// Build the payload from an environment value and the config file.
    ///
    /// A non-blank environment value takes precedence.
    pub fn resolve(env_value: Option<String>, config: &Config) -> Self {
        let key = env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| config.provider_api_key(ProviderId::OpenWeather).map(str::to_owned));

        match key {
            Some(api_key) => ApiKeyPayload::Key { api_key },
            None => ApiKeyPayload::Error {
                error: KEY_UNSET_MESSAGE.to_string(),
            },
        }
    }

    /// Same as [`ApiKeyPayload::resolve`], reading `OPENWEATHERMAP_API_KEY`.
    pub fn from_env(config: &Config) -> Self {
        Self::resolve(std::env::var(API_KEY_ENV).ok(), config)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ApiKeyPayload::Error { .. })
    }

    pub fn into_key(self) -> Result<String, WeatherError> {
        match self {
            ApiKeyPayload::Key { api_key } if !api_key.trim().is_empty() => Ok(api_key),
            ApiKeyPayload::Key { .. } => Err(WeatherError::Configuration(
                KEY_UNSET_MESSAGE.to_string(),
            )),
            ApiKeyPayload::Error { error } => Err(WeatherError::Configuration(error)),
        }
    }
}

/// Ask a key endpoint for the API key.
///
/// An error payload becomes [`WeatherError::Configuration`] even when it
/// arrives with a non-success status.
pub async fn fetch_api_key(http: &Client, url: &str) -> Result<String, WeatherError> {
    let res = http.get(url).send().await?;

    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return match serde_json::from_str::<ApiKeyPayload>(&body) {
            Ok(payload @ ApiKeyPayload::Error { .. }) => payload.into_key(),
            _ => Err(WeatherError::http(status, &body)),
        };
    }

    serde_json::from_str::<ApiKeyPayload>(&body)?.into_key()
}
