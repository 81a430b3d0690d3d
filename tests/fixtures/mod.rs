//! Test fixtures for nav-tracker.
//!
//! Provides realistic test data including:
//! - Real São Paulo locations (from OpenStreetMap)
//! - Synthetic equator routes with known meter spacing

#![allow(dead_code)]

pub mod sao_paulo_locations;

pub use sao_paulo_locations::*;

use nav_tracker::geo::GeoPoint;
use nav_tracker::polyline::Route;

pub fn pt(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon)
}

/// A route along the equator with vertices every 0.001° of longitude
/// (~111 m apart), starting at (0, 0).
pub fn equator_route(vertices: usize) -> Route {
    Route::new((0..vertices).map(|i| pt(0.0, i as f64 * 0.001)).collect())
}
