//! Geographic point type and spherical-earth math.
//!
//! All functions use a spherical approximation (haversine); the error over
//! tracking-grade distances is well below the GPS noise floor.

use serde::{Deserialize, Serialize};

use crate::error::{NavError, NavResult};
use crate::polyline::Route;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both coordinates are finite (rejects NaN and infinities).
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Haversine great-circle distance between two points in meters.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Initial compass bearing from `from` to `to`, in degrees `[0, 360)`.
pub fn bearing_degrees(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Minimum distance in meters from `p` to the polyline formed by `path`.
///
/// Considers segment interiors, not just vertices: a position midway between
/// two sparse route points still measures as on-route.
///
/// Fails with `InvalidPath` when `path` has fewer than 2 points.
pub fn distance_to_path(p: GeoPoint, path: &Route) -> NavResult<f64> {
    let points = path.points();
    if points.len() < 2 {
        return Err(NavError::InvalidPath);
    }

    let mut min = f64::INFINITY;
    for segment in points.windows(2) {
        let projected = project_on_segment(p, segment[0], segment[1]);
        let dist = distance_meters(p, projected);
        if dist < min {
            min = dist;
        }
    }
    Ok(min)
}

/// Index of the `path` vertex closest to `p` by haversine distance.
///
/// Ties break to the lowest index. Fails with `InvalidPath` on an empty path.
pub fn nearest_vertex_index(p: GeoPoint, path: &Route) -> NavResult<usize> {
    let points = path.points();
    if points.is_empty() {
        return Err(NavError::InvalidPath);
    }

    let mut best_index = 0;
    let mut best_dist = f64::INFINITY;
    for (i, vertex) in points.iter().enumerate() {
        let dist = distance_meters(p, *vertex);
        if dist < best_dist {
            best_dist = dist;
            best_index = i;
        }
    }
    Ok(best_index)
}

/// Project `p` onto the segment `a`-`b`, clamped to the segment.
///
/// Planar approximation scaled by the latitude cosine; accurate enough for
/// the short segments routing services emit (well under 10 km).
fn project_on_segment(p: GeoPoint, a: GeoPoint, b: GeoPoint) -> GeoPoint {
    let cos_lat = ((a.lat + b.lat) / 2.0).to_radians().cos();

    let dx = (b.lon - a.lon) * cos_lat;
    let dy = b.lat - a.lat;
    let px = (p.lon - a.lon) * cos_lat;
    let py = p.lat - a.lat;

    let seg_len_sq = dx * dx + dy * dy;
    if seg_len_sq < 1e-20 {
        // Degenerate segment
        return a;
    }

    let t = ((px * dx + py * dy) / seg_len_sq).clamp(0.0, 1.0);

    GeoPoint {
        lat: a.lat + t * (b.lat - a.lat),
        lon: a.lon + t * (b.lon - a.lon),
    }
}
