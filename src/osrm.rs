//! OSRM HTTP adapter for route requests.

use serde::Deserialize;

use crate::error::ProviderError;
use crate::geo::GeoPoint;
use crate::polyline::{self, Route};
use crate::traits::RouteProvider;

/// Precision of OSRM's encoded route geometries.
const GEOMETRY_PRECISION: u32 = 5;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl RouteProvider for OsrmClient {
    fn route_between(&self, from: GeoPoint, to: GeoPoint) -> Result<Route, ProviderError> {
        // OSRM takes lon,lat pairs
        let url = format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&geometries=polyline",
            self.config.base_url, self.config.profile, from.lon, from.lat, to.lon, to.lat
        );

        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(ProviderError::Service {
                status: response.status().as_u16(),
                message: response.text().unwrap_or_default(),
            });
        }

        let body: OsrmRouteResponse = response.json()?;
        let geometry = body
            .routes
            .into_iter()
            .next()
            .map(|route| route.geometry)
            .ok_or(ProviderError::NoRoute)?;

        let route = polyline::decode(&geometry, GEOMETRY_PRECISION)
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;
        if route.is_empty() {
            return Err(ProviderError::NoRoute);
        }
        Ok(route)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: String,
}
