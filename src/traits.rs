//! Collaborator seams for the navigation core.
//!
//! These are intentionally minimal and platform-agnostic. Concrete apps
//! supply HTTP clients, a rendering adapter, a location feed, and a wake
//! lock; the core only sees these traits.

use crate::error::ProviderError;
use crate::geo::GeoPoint;
use crate::location::LocationSubscription;
use crate::polyline::Route;

/// A routing service: origin and destination in, decoded route out.
pub trait RouteProvider {
    fn route_between(&self, from: GeoPoint, to: GeoPoint) -> Result<Route, ProviderError>;
}

/// A single place-search candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub display_name: String,
    pub position: GeoPoint,
}

/// A geocoding service: free-text query in, ordered candidates out.
pub trait PlaceSearch {
    fn search(&self, query: &str) -> Result<Vec<SearchResult>, ProviderError>;
}

/// Rendering adapter for declarative camera instructions.
///
/// The tracking core never calls this directly; the session applies tracker
/// decisions to it.
pub trait MapCamera {
    fn set_center(&mut self, position: GeoPoint, zoom: u8, animate: bool);
    fn set_bearing(&mut self, degrees: f64);
    fn pan_to(&mut self, position: GeoPoint);
}

/// A source of live location fixes.
///
/// Subscribing returns a handle that cancels the underlying watch exactly
/// once when dropped, so a session can never leave duplicate watches
/// running.
pub trait LocationSource {
    fn subscribe(&self) -> Result<LocationSubscription, ProviderError>;
}

/// Keeps the display awake while tracking is active.
///
/// The platform may revoke the lock at any time; `is_held` reflects the last
/// known state so the session can re-acquire when the app regains
/// visibility.
pub trait WakeLock {
    /// Attempts to take the lock. Returns whether it is now held.
    fn acquire(&mut self) -> bool;
    /// Releases the lock if held; releasing an unheld lock is a no-op.
    fn release(&mut self);
    fn is_held(&self) -> bool;
}
