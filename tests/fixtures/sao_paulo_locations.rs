//! Real São Paulo locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. These are real, routable
//! locations in the city center and along Avenida Paulista.

use nav_tracker::geo::GeoPoint;
use nav_tracker::polyline::Route;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lon: f64) -> Self {
        Self { name, lat, lon }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

pub const LANDMARKS: &[Location] = &[
    Location::new("Praça da Sé", -23.5503159, -46.6339101),
    Location::new("Theatro Municipal", -23.5453264, -46.6386224),
    Location::new("Mercado Municipal", -23.5416086, -46.6294565),
    Location::new("Estação da Luz", -23.5346224, -46.6357902),
    Location::new("Pinacoteca", -23.5340278, -46.6336111),
    Location::new("MASP", -23.5614855, -46.6558819),
    Location::new("Parque Ibirapuera", -23.5874162, -46.6576336),
    Location::new("Aeroporto de Congonhas", -23.6273246, -46.6565554),
];

/// Waypoints along Avenida Paulista, from Praça Oswaldo Cruz toward
/// Consolação, in travel order.
pub const AVENIDA_PAULISTA: &[Location] = &[
    Location::new("Praça Oswaldo Cruz", -23.5707639, -46.6445365),
    Location::new("Parque Trianon", -23.5618000, -46.6556000),
    Location::new("MASP", -23.5614855, -46.6558819),
    Location::new("Av. Paulista x R. Augusta", -23.5571000, -46.6620000),
    Location::new("Consolação", -23.5556000, -46.6622000),
];

pub fn landmark(name: &str) -> GeoPoint {
    LANDMARKS
        .iter()
        .chain(AVENIDA_PAULISTA.iter())
        .find(|location| location.name == name)
        .unwrap_or_else(|| panic!("unknown landmark: {name}"))
        .point()
}

/// The Avenida Paulista waypoints as a route.
pub fn avenida_paulista_route() -> Route {
    Route::new(
        AVENIDA_PAULISTA
            .iter()
            .map(|location| location.point())
            .collect(),
    )
}
