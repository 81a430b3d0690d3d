//! Route geometry and the encoded-polyline codec.
//!
//! A `Route` stores decoded latitude/longitude points in travel order.
//! Encoding/decoding of the compact polyline format happens at API
//! boundaries (when receiving a geometry from the routing service), never
//! inside the tracking core.

use serde::{Deserialize, Serialize};

use crate::error::{NavError, NavResult};
use crate::geo::GeoPoint;

/// An ordered path from origin toward destination.
///
/// Insertion order is travel order. An empty route signals "no route".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    points: Vec<GeoPoint>,
}

impl Route {
    /// Creates a route from decoded coordinate points.
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// An empty route ("no route").
    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Consumes the route and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<GeoPoint> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<GeoPoint> {
        self.points.last().copied()
    }
}

/// Decodes an encoded polyline string into a `Route`.
///
/// The input is a sequence of 5-bit groups (offset by 63, continuation bit
/// `0x20`) holding zig-zag signed coordinate deltas; successive deltas
/// accumulate onto a running (lat, lon) pair scaled by `10^precision`.
///
/// Fails with `MalformedInput` when the stream ends in the middle of a
/// coordinate group or after a latitude with no matching longitude. A
/// truncated geometry is never silently shortened.
pub fn decode(encoded: &str, precision: u32) -> NavResult<Route> {
    let bytes = encoded.as_bytes();
    let factor = 10f64.powi(precision as i32);

    let mut points = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while index < bytes.len() {
        lat += decode_value(bytes, &mut index)?;
        lon += decode_value(bytes, &mut index)?;
        points.push(GeoPoint::new(lat as f64 / factor, lon as f64 / factor));
    }

    Ok(Route::new(points))
}

/// Encodes a route into the compact polyline format, inverse of [`decode`].
pub fn encode(route: &Route, precision: u32) -> String {
    let factor = 10f64.powi(precision as i32);

    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lon: i64 = 0;

    for point in route.points() {
        let lat = (point.lat * factor).round() as i64;
        let lon = (point.lon * factor).round() as i64;
        encode_value(lat - prev_lat, &mut out);
        encode_value(lon - prev_lon, &mut out);
        prev_lat = lat;
        prev_lon = lon;
    }

    out
}

/// Reads one zig-zag encoded delta starting at `*index`.
fn decode_value(bytes: &[u8], index: &mut usize) -> NavResult<i64> {
    let mut shift = 0u32;
    let mut result: i64 = 0;

    loop {
        if *index >= bytes.len() {
            return Err(NavError::MalformedInput(*index));
        }
        // A real coordinate delta fits in far fewer groups; an endless
        // continuation run is corrupt input, not a bigger number
        if shift >= 64 {
            return Err(NavError::MalformedInput(*index));
        }
        let byte = bytes[*index].wrapping_sub(63) as i64;
        *index += 1;

        result |= (byte & 0x1f) << shift;
        shift += 5;

        if byte < 0x20 {
            break;
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= 0x20 {
        out.push((((v & 0x1f) | 0x20) + 63) as u8 as char);
        v >>= 5;
    }
    out.push((v + 63) as u8 as char);
}
