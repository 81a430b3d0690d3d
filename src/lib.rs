//! nav-tracker: turn-tracking navigation core.
//!
//! Live route tracking over a stream of GPS fixes: off-route detection and
//! recalculation, monotonic route trimming, arrival, and declarative camera
//! commands for a map rendering adapter.

pub mod debounce;
pub mod error;
pub mod geo;
pub mod location;
pub mod nominatim;
pub mod osrm;
pub mod polyline;
pub mod search;
pub mod session;
pub mod tracker;
pub mod traits;
