//! In-memory city catalog with a remotely refreshable list.

use std::{collections::HashSet, sync::Arc};

use parking_lot::RwLock;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Deserialize;

use crate::{error::WeatherError, model::City};

/// The hardcoded fallback list. Always non-empty.
pub fn default_cities() -> Vec<City> {
    vec![
        City::new("北京", "中国", 39.9042, 116.4074),
        City::new("上海", "中国", 31.2304, 121.4737),
        City::new("广州", "中国", 23.1291, 113.2644),
        City::new("深圳", "中国", 22.5431, 114.0579),
        City::new("东京", "日本", 35.6762, 139.6503),
        City::new("纽约", "美国", 40.7128, -74.0060),
        City::new("伦敦", "英国", 51.5074, -0.1278),
        City::new("巴黎", "法国", 48.8566, 2.3522),
        City::new("悉尼", "澳大利亚", -33.8688, 151.2093),
        City::new("莫斯科", "俄罗斯", 55.7558, 37.6173),
    ]
}

/// Uniformly random member of `cities`, or `None` when it is empty.
pub fn pick_random(cities: &[City]) -> Option<&City> {
    cities.choose(&mut rand::thread_rng())
}

/// Case-insensitive substring match on name or country.
///
/// A blank term matches nothing.
pub fn search(cities: &[City], term: &str) -> Vec<City> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }

    cities
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&term) || c.country.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

/// Exact, case-insensitive lookup by city name.
pub fn find(cities: &[City], name: &str) -> Option<City> {
    let name = name.trim().to_lowercase();
    cities.iter().find(|c| c.name.to_lowercase() == name).cloned()
}

#[derive(Debug, Deserialize)]
struct CityListResponse {
    cities: Vec<City>,
}

/// Owned city list. The snapshot is swapped wholesale and never left empty.
#[derive(Debug)]
pub struct CityCatalog {
    cities: RwLock<Arc<[City]>>,
    source: Option<String>,
    http: Client,
}

impl CityCatalog {
    pub fn with_defaults() -> Self {
        Self {
            cities: RwLock::new(default_cities().into()),
            source: None,
            http: Client::new(),
        }
    }

    /// Catalog seeded with the defaults that refreshes from `url`.
    pub fn with_source(url: impl Into<String>) -> Self {
        Self {
            source: Some(url.into()),
            ..Self::with_defaults()
        }
    }

    pub fn cities(&self) -> Arc<[City]> {
        Arc::clone(&*self.cities.read())
    }

    /// Swap in a new list, dropping duplicate `(name, country)` pairs.
    ///
    /// Returns `false` and keeps the current list when `cities` is empty.
    pub fn replace(&self, cities: Vec<City>) -> bool {
        let mut seen = HashSet::new();
        let unique: Vec<City> = cities
            .into_iter()
            .filter(|c| seen.insert((c.name.clone(), c.country.clone())))
            .collect();

        if unique.is_empty() {
            return false;
        }

        *self.cities.write() = unique.into();
        true
    }

    /// Reload from the configured source.
    ///
    /// Never fails: on any error the current list is kept and returned.
    pub async fn refresh(&self) -> Arc<[City]> {
        let Some(url) = self.source.as_deref() else {
            tracing::debug!("No city list source configured, keeping current list");
            return self.cities();
        };

        match self.fetch_remote(url).await {
            Ok(cities) => {
                let count = cities.len();
                if self.replace(cities) {
                    tracing::info!("Loaded {} cities from {}", count, url);
                } else {
                    tracing::warn!("City list from {} was empty, keeping current list", url);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to refresh city list from {}: {}", url, e);
            }
        }

        self.cities()
    }

    /// Random city from the current list.
    pub fn random_city(&self) -> City {
        let cities = self.cities();
        match pick_random(&cities) {
            Some(city) => city.clone(),
            // The snapshot is never empty; this only guards the invariant.
            None => default_cities().swap_remove(0),
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<City>, WeatherError> {
        let res = self.http.get(url).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::http(status, &body));
        }

        let parsed: CityListResponse = serde_json::from_str(&body)?;
        Ok(parsed.cities)
    }
}

impl Default for CityCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_ten_unique_cities() {
        let cities = default_cities();
        assert_eq!(cities.len(), 10);

        let keys: HashSet<_> = cities.iter().map(City::key).collect();
        assert_eq!(keys.len(), 10);
    }

    #[test]
    fn sydney_is_south_of_the_equator() {
        let sydney = find(&default_cities(), "悉尼").unwrap();
        assert_eq!(sydney.latitude, -33.8688);
        assert_eq!(sydney.longitude, 151.2093);
    }

    #[test]
    fn search_empty_term_returns_nothing() {
        let cities = default_cities();
        assert!(search(&cities, "").is_empty());
        assert!(search(&cities, "   ").is_empty());
    }

    #[test]
    fn search_matches_country() {
        let names: Vec<_> = search(&default_cities(), "中国").into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["北京", "上海", "广州", "深圳"]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let cities = vec![
            City::new("Berlin", "Germany", 52.52, 13.405),
            City::new("Bern", "Switzerland", 46.948, 7.4474),
            City::new("Oslo", "Norway", 59.9139, 10.7522),
        ];

        let names: Vec<_> = search(&cities, "BER").into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Berlin", "Bern"]);

        let names: Vec<_> = search(&cities, "nor").into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Oslo"]);
    }

    #[test]
    fn search_without_match_is_empty() {
        assert!(search(&default_cities(), "atlantis").is_empty());
    }

    #[test]
    fn find_is_exact_on_name() {
        let cities = vec![City::new("Paris", "France", 48.8566, 2.3522)];
        assert_eq!(find(&cities, "paris").map(|c| c.country), Some("France".to_string()));
        assert!(find(&cities, "par").is_none());
    }

    #[test]
    fn pick_random_returns_a_member() {
        let cities = default_cities();
        for _ in 0..100 {
            let city = pick_random(&cities).expect("non-empty list");
            assert!(cities.contains(city));
        }
    }

    #[test]
    fn pick_random_on_empty_is_none() {
        assert!(pick_random(&[]).is_none());
    }

    #[test]
    fn replace_rejects_empty_list() {
        let catalog = CityCatalog::with_defaults();
        assert!(!catalog.replace(Vec::new()));
        assert_eq!(catalog.cities().len(), 10);
    }

    #[test]
    fn replace_drops_duplicates() {
        let catalog = CityCatalog::with_defaults();
        let oslo = City::new("Oslo", "Norway", 59.9139, 10.7522);
        assert!(catalog.replace(vec![oslo.clone(), oslo.clone(), City::new("Oslo", "USA", 0.0, 0.0)]));

        let cities = catalog.cities();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0], oslo);
    }

    #[test]
    fn old_snapshot_survives_replace() {
        let catalog = CityCatalog::with_defaults();
        let before = catalog.cities();
        catalog.replace(vec![City::new("Oslo", "Norway", 59.9139, 10.7522)]);

        assert_eq!(before.len(), 10);
        assert_eq!(catalog.cities().len(), 1);
    }

    #[test]
    fn random_city_comes_from_catalog() {
        let catalog = CityCatalog::with_defaults();
        let city = catalog.random_city();
        assert!(catalog.cities().contains(&city));
    }

    #[tokio::test]
    async fn refresh_without_source_keeps_defaults() {
        let catalog = CityCatalog::with_defaults();
        let cities = catalog.refresh().await;
        assert_eq!(&*cities, default_cities().as_slice());
    }
}
