use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codes::{UNKNOWN_CODE, describe_code};
use crate::provider::ProviderId;

/// A named geographic point. Two cities are the same city when their
/// `(name, country)` pair matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    pub fn new(name: &str, country: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            country: country.to_string(),
            latitude,
            longitude,
        }
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.name, &self.country)
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.name, self.country)
    }
}

/// Wind speed unit as reported by a provider. Readings are never converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindUnit {
    KilometresPerHour,
    MetresPerSecond,
}

impl WindUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            WindUnit::KilometresPerHour => "km/h",
            WindUnit::MetresPerSecond => "m/s",
        }
    }
}

/// Units a provider reports its readings in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderUnits {
    pub temperature: &'static str,
    pub wind: WindUnit,
}

/// Normalized snapshot of current conditions for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature: f64,
    /// WMO code for Open-Meteo, condition id for OpenWeatherMap.
    pub weather_code: i32,
    pub wind_speed: f64,
    pub humidity: u8,
    pub city: City,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub provider: ProviderId,
    pub wind_unit: WindUnit,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherReading {
    /// Description and icon to display.
    ///
    /// Open-Meteo readings go through the WMO table; OpenWeatherMap readings
    /// carry their own text and icon URL.
    pub fn condition(&self) -> (String, String) {
        match self.provider {
            ProviderId::OpenMeteo => {
                let entry = describe_code(self.weather_code);
                (entry.description.to_string(), entry.icon.to_string())
            }
            ProviderId::OpenWeather => (
                self.description
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_CODE.description.to_string()),
                self.icon.clone().unwrap_or_else(|| UNKNOWN_CODE.icon.to_string()),
            ),
        }
    }
}
