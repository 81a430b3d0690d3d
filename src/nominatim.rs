//! Nominatim HTTP adapter for place search.

use serde::Deserialize;
use tracing::warn;

use crate::error::ProviderError;
use crate::geo::GeoPoint;
use crate::traits::{PlaceSearch, SearchResult};

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "nav-tracker/0.2".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }
}

impl PlaceSearch for NominatimClient {
    fn search(&self, query: &str) -> Result<Vec<SearchResult>, ProviderError> {
        let url = format!("{}/search", self.config.base_url);
        let response = self
            .client
            .get(url)
            .query(&[("format", "json"), ("q", query)])
            .send()?;
        if !response.status().is_success() {
            return Err(ProviderError::Service {
                status: response.status().as_u16(),
                message: response.text().unwrap_or_default(),
            });
        }

        let places: Vec<NominatimPlace> = response.json()?;
        Ok(places.into_iter().filter_map(into_search_result).collect())
    }
}

/// Nominatim returns coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

fn into_search_result(place: NominatimPlace) -> Option<SearchResult> {
    match (place.lat.parse::<f64>(), place.lon.parse::<f64>()) {
        (Ok(lat), Ok(lon)) => Some(SearchResult {
            display_name: place.display_name,
            position: GeoPoint::new(lat, lon),
        }),
        _ => {
            warn!(place = %place.display_name, "skipping result with unparseable coordinates");
            None
        }
    }
}
