use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use weather_core::{
    ApiKeyPayload, City, CityCatalog, Config, ProviderId, ProviderUnits, Session, ViewState,
    WeatherProvider, default_provider_from_config, find, provider_from_config, search,
};

use crate::display;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for cities around the world")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, "openmeteo" or "openweather".
        provider: String,
    },

    /// Show weather for a city. Prompts for one when omitted.
    Show {
        /// City name, or part of a city or country name.
        city: Option<String>,

        /// Provider to ask instead of the configured default.
        #[arg(long)]
        provider: Option<String>,
    },

    /// Show weather for a random city.
    Random {
        /// Provider to ask instead of the configured default.
        #[arg(long)]
        provider: Option<String>,
    },

    /// List known cities, or those matching a search term.
    Cities {
        /// Case-insensitive part of a city or country name.
        term: Option<String>,
    },

    /// Print the OpenWeatherMap API key payload as JSON.
    Key,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { city, provider } => {
                let config = Config::load()?.with_env_overrides();
                let cities = load_catalog(&config).refresh().await;
                let city = match city {
                    Some(name) => resolve_city(&cities, &name)?,
                    None => prompt_city(&cities)?,
                };
                let provider = select_provider(&config, provider.as_deref())?;
                show_weather(provider.as_ref(), &city).await
            }
            Command::Random { provider } => {
                let config = Config::load()?.with_env_overrides();
                let catalog = load_catalog(&config);
                catalog.refresh().await;
                let city = catalog.random_city();
                let provider = select_provider(&config, provider.as_deref())?;
                show_weather(provider.as_ref(), &city).await
            }
            Command::Cities { term } => {
                let config = Config::load()?.with_env_overrides();
                let cities = load_catalog(&config).refresh().await;
                let listed = match term.as_deref() {
                    Some(term) => search(&cities, term),
                    None => cities.to_vec(),
                };

                if listed.is_empty() {
                    println!("No matching cities.");
                }
                for city in listed {
                    println!("{city} ({:.4}, {:.4})", city.latitude, city.longitude);
                }
                Ok(())
            }
            Command::Key => {
                let payload = ApiKeyPayload::from_env(&Config::load()?);
                println!("{}", serde_json::to_string(&payload)?);
                ensure_key(&payload)
            }
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    if id.requires_api_key() {
        let api_key = inquire::Password::new(&format!("{} API key:", id.display_name()))
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?;
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            bail!("API key must not be empty");
        }
        config.upsert_provider_api_key(id, api_key);
    } else {
        println!("{} needs no API key.", id.display_name());
        if config.default_provider.is_none() {
            config.set_default_provider(id);
        }
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn load_catalog(config: &Config) -> CityCatalog {
    match config.cities_url.as_deref() {
        Some(url) => CityCatalog::with_source(url),
        None => CityCatalog::with_defaults(),
    }
}

fn select_provider(
    config: &Config,
    requested: Option<&str>,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let provider = match requested {
        Some(name) => provider_from_config(ProviderId::try_from(name)?, config)?,
        None => default_provider_from_config(config)?,
    };
    Ok(provider)
}

/// Exact name first, then the first search hit.
fn resolve_city(cities: &[City], name: &str) -> anyhow::Result<City> {
    if let Some(city) = find(cities, name) {
        return Ok(city);
    }

    match search(cities, name).into_iter().next() {
        Some(city) => Ok(city),
        None => bail!("No city matching '{name}'. Hint: run `weather cities` to list known cities."),
    }
}

fn prompt_city(cities: &[City]) -> anyhow::Result<City> {
    let scorer = |input: &str, city: &City, _: &str, _: usize| -> Option<i64> {
        if input.trim().is_empty() || !search(std::slice::from_ref(city), input).is_empty() {
            Some(0)
        } else {
            None
        }
    };

    inquire::Select::new("City:", cities.to_vec())
        .with_scorer(&scorer)
        .prompt()
        .context("No city selected")
}

/// An error payload fails the command after it has been printed.
fn ensure_key(payload: &ApiKeyPayload) -> anyhow::Result<()> {
    if payload.is_error() {
        bail!("No {} API key is available", ProviderId::OpenWeather.display_name());
    }
    Ok(())
}

async fn show_weather(provider: &dyn WeatherProvider, city: &City) -> anyhow::Result<()> {
    let units = provider.units();
    eprintln!("{}", display::render(&ViewState::Loading { city: city.clone() }, units));

    let view = Session::new().fetch(provider, city).await;
    println!("{}", finished_view(&view, units)?);
    Ok(())
}

/// Text for a settled lookup. A failed lookup becomes the command's error.
fn finished_view(view: &ViewState, units: ProviderUnits) -> anyhow::Result<String> {
    match view {
        ViewState::Ready(_) => Ok(display::render(view, units)),
        ViewState::Failed { .. } => bail!("{}", display::render(view, units)),
        ViewState::Idle | ViewState::Loading { .. } => bail!("Weather lookup did not finish"),
    }
}
