use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::provider::{ProviderId, openweather::DEFAULT_LANGUAGE};
use crate::secrets::API_KEY_ENV;

/// Overrides the city list endpoint.
pub const CITIES_URL_ENV: &str = "WEATHER_CITIES_URL";

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default provider id, "openmeteo" or "openweather".
    pub default_provider: Option<String>,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Endpoint serving `{"cities": [...]}`.
    pub cities_url: Option<String>,

    /// Language for provider-supplied descriptions, e.g. "zh_cn" or "en".
    pub language: Option<String>,
}

impl Config {
    /// The configured default provider, if any.
    pub fn default_provider_id(&self) -> Result<Option<ProviderId>> {
        self.default_provider
            .as_deref()
            .map(ProviderId::try_from)
            .transpose()
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-lookup", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Layer environment overrides over the file values.
    ///
    /// The result is meant for the running process only; saving it would
    /// persist values that came from the environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_blank(API_KEY_ENV) {
            self.providers
                .insert(ProviderId::OpenWeather.as_str().to_string(), ProviderConfig { api_key: key });
        }
        if let Some(url) = non_blank(CITIES_URL_ENV) {
            self.cities_url = Some(url);
        }
        self
    }

    /// Convenience helper: set/replace a provider API key and optionally set default provider.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });

        if self.default_provider.is_none() {
            self.default_provider = Some(provider_id.to_string());
        }
    }

    /// Returns a non-blank API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)
            .map(|cfg| cfg.api_key.as_str())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        !provider_id.requires_api_key() || self.provider_api_key(provider_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    #[test]
    fn default_provider_id_is_none_when_not_set() {
        let cfg = Config::default();
        assert_eq!(cfg.default_provider_id().unwrap(), None);
    }

    #[test]
    fn default_provider_id_errors_on_unknown_name() {
        let cfg = Config {
            default_provider: Some("weatherbit".into()),
            ..Config::default()
        };
        let err = cfg.default_provider_id().unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn set_api_key_and_default_for_provider() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OPEN_KEY".into());

        let default = cfg.default_provider_id().unwrap();
        assert_eq!(default, Some(ProviderId::OpenWeather));

        let key = cfg.provider_api_key(ProviderId::OpenWeather);
        assert_eq!(key, Some("OPEN_KEY"));
        assert!(cfg.is_provider_configured(ProviderId::OpenWeather));
    }

    #[test]
    fn upsert_does_not_override_existing_default() {
        let mut cfg = Config::default();
        cfg.set_default_provider(ProviderId::OpenMeteo);

        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OPEN_KEY".into());

        assert_eq!(cfg.default_provider_id().unwrap(), Some(ProviderId::OpenMeteo));
        assert!(cfg.is_provider_configured(ProviderId::OpenWeather));
    }

    #[test]
    fn open_meteo_is_always_configured() {
        assert!(Config::default().is_provider_configured(ProviderId::OpenMeteo));
        assert!(!Config::default().is_provider_configured(ProviderId::OpenWeather));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "   ".into());
        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), None);
    }

    #[test]
    fn language_defaults_to_chinese() {
        assert_eq!(Config::default().language(), "zh_cn");
    }

    #[test]
    fn env_overrides_key_and_cities_url() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "FILE_KEY".into());

        let cfg = cfg.with_overrides_from(|name| match name {
            "OPENWEATHERMAP_API_KEY" => Some("ENV_KEY".to_string()),
            "WEATHER_CITIES_URL" => Some("http://localhost:3000/api/cities".to_string()),
            _ => None,
        });

        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("ENV_KEY"));
        assert_eq!(cfg.cities_url.as_deref(), Some("http://localhost:3000/api/cities"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "FILE_KEY".into());

        let cfg = cfg.with_overrides_from(|_| Some(String::new()));
        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("FILE_KEY"));
        assert!(cfg.cities_url.is_none());
    }

    #[test]
    fn parses_toml() {
        let cfg: Config = toml::from_str(
            r#"
            default_provider = "openweather"
            cities_url = "http://localhost:3000/api/cities"

            [providers.openweather]
            api_key = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.default_provider_id().unwrap(), Some(ProviderId::OpenWeather));
        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("abc"));
        assert_eq!(cfg.language(), "zh_cn");
    }
}
