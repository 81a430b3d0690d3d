//! Live route tracking: off-route detection, route trimming, recalculation
//! and arrival.
//!
//! `RouteTracker` is a state machine driven by discrete location fixes. Each
//! update returns a [`TrackerDecision`] describing what the caller should do
//! (request a new route, show arrival, move the camera) instead of mutating
//! any rendering state directly. Time is always passed in explicitly, so the
//! machine is deterministic under test.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{NavError, NavResult};
use crate::geo::{self, GeoPoint};
use crate::polyline::Route;

/// Perpendicular distance from the route polyline beyond which the user is
/// considered off-route.
pub const OFF_ROUTE_THRESHOLD_M: f64 = 30.0;

/// Distance from the destination below which the user has arrived.
pub const ARRIVAL_THRESHOLD_M: f64 = 15.0;

/// Minimum bearing change before a map-rotation command is emitted.
pub const BEARING_CHANGE_MIN_DEG: f64 = 10.0;

/// How long the recalculating indicator stays up after an off-route fix.
/// A UI debounce only: further off-route fixes inside the window still
/// produce recalculation requests.
pub const RECALC_COOLDOWN: Duration = Duration::from_secs(3);

/// How long the arrival indicator stays up before the tracker reads as idle.
pub const ARRIVAL_DISPLAY: Duration = Duration::from_secs(4);

/// Map zoom level used while actively tracking.
pub const TRACKING_ZOOM: u8 = 17;

/// Observable tracker phase, derived from state plus the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Tracking,
    Recalculating,
    Arrived,
}

/// A request for a fresh route, tagged with the destination it was issued
/// for. The tag must be handed back to [`RouteTracker::apply_recalculated_route`]
/// so late responses for a superseded destination are dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecalcRequest {
    pub from: GeoPoint,
    pub to: GeoPoint,
}

/// A declarative camera instruction for the rendering adapter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    Center {
        position: GeoPoint,
        zoom: u8,
        animate: bool,
    },
    Bearing {
        degrees: f64,
    },
}

/// The outcome of a single location update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerDecision {
    /// Set when the user has left the route and a new one must be fetched.
    pub recalculate: Option<RecalcRequest>,
    /// Set when the user reached the destination; route and destination are
    /// already cleared when this is returned.
    pub arrived: bool,
    /// Camera instructions, in application order.
    pub camera: Vec<CameraCommand>,
}

/// Turn-tracking state machine.
#[derive(Debug)]
pub struct RouteTracker {
    route: Route,
    destination: Option<GeoPoint>,
    last_position: Option<GeoPoint>,
    last_bearing: f64,
    recalc_deadline: Option<Instant>,
    arrival_deadline: Option<Instant>,
}

impl Default for RouteTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTracker {
    pub fn new() -> Self {
        Self {
            route: Route::empty(),
            destination: None,
            last_position: None,
            last_bearing: 0.0,
            recalc_deadline: None,
            arrival_deadline: None,
        }
    }

    /// Starts tracking toward `destination` along `initial_route`, replacing
    /// any prior route and destination atomically.
    ///
    /// The route must be non-empty; callers obtain it from a route provider
    /// first. Fails with `InvalidPath` otherwise.
    pub fn set_destination(&mut self, destination: GeoPoint, initial_route: Route) -> NavResult<()> {
        if !destination.is_finite() {
            return Err(NavError::InvalidFix);
        }
        if initial_route.is_empty() {
            return Err(NavError::InvalidPath);
        }
        self.destination = Some(destination);
        self.route = initial_route;
        self.recalc_deadline = None;
        self.arrival_deadline = None;
        Ok(())
    }

    /// Processes one location fix.
    ///
    /// Fixes with non-finite coordinates fail with `InvalidFix` and leave
    /// state untouched. With no destination, or a route too short to form a
    /// segment, the fix only refreshes the last known position.
    pub fn on_location_update(
        &mut self,
        position: GeoPoint,
        now: Instant,
    ) -> NavResult<TrackerDecision> {
        if !position.is_finite() {
            return Err(NavError::InvalidFix);
        }

        let Some(destination) = self.destination else {
            self.last_position = Some(position);
            return Ok(TrackerDecision::default());
        };
        if self.route.len() < 2 {
            // Insufficient geometry to judge off-route
            self.last_position = Some(position);
            return Ok(TrackerDecision::default());
        }

        let mut decision = TrackerDecision::default();

        let off_route_m = geo::distance_to_path(position, &self.route)?;
        if off_route_m > OFF_ROUTE_THRESHOLD_M {
            debug!(distance_m = off_route_m, "off route, requesting recalculation");
            decision.recalculate = Some(RecalcRequest {
                from: position,
                to: destination,
            });
            self.recalc_deadline = Some(now + RECALC_COOLDOWN);
        } else {
            // Trim the consumed portion and prepend the live position as the
            // new head. Ties in the vertex search resolve to the earliest
            // index, so the trim never skips ahead.
            let idx = geo::nearest_vertex_index(position, &self.route)?;
            let mut remaining = Vec::with_capacity(self.route.len() - idx);
            remaining.push(position);
            remaining.extend_from_slice(&self.route.points()[idx + 1..]);
            self.route = Route::new(remaining);
        }

        if geo::distance_meters(position, destination) < ARRIVAL_THRESHOLD_M {
            decision.arrived = true;
            self.destination = None;
            self.route = Route::empty();
            self.recalc_deadline = None;
            self.arrival_deadline = Some(now + ARRIVAL_DISPLAY);
            self.last_position = Some(position);
            return Ok(decision);
        }

        if let Some(previous) = self.last_position {
            let bearing = geo::bearing_degrees(previous, position);
            if (bearing - self.last_bearing).abs() > BEARING_CHANGE_MIN_DEG {
                // Rotate the map against the direction of travel so the
                // route ahead points up
                decision.camera.push(CameraCommand::Bearing { degrees: -bearing });
                self.last_bearing = bearing;
            }
        }
        decision.camera.push(CameraCommand::Center {
            position,
            zoom: TRACKING_ZOOM,
            animate: true,
        });

        self.last_position = Some(position);
        Ok(decision)
    }

    /// Marker-drag repositioning: a single location update with immediate
    /// effect, not a separate tracking path.
    pub fn user_repositioned(
        &mut self,
        position: GeoPoint,
        now: Instant,
    ) -> NavResult<TrackerDecision> {
        self.on_location_update(position, now)
    }

    /// Installs a recalculated route.
    ///
    /// `requested_for` is the destination tag carried by the originating
    /// [`RecalcRequest`]. When the destination has changed (or was cleared)
    /// since the request was issued, the response fails with
    /// `StaleRecalculation` and must be discarded. Responses arriving after
    /// the cooldown lapsed but for an unchanged destination still apply.
    pub fn apply_recalculated_route(
        &mut self,
        new_route: Route,
        requested_for: GeoPoint,
    ) -> NavResult<()> {
        if self.destination != Some(requested_for) {
            debug!("dropping recalculated route for superseded destination");
            return Err(NavError::StaleRecalculation);
        }
        if new_route.is_empty() {
            return Err(NavError::InvalidPath);
        }
        self.route = new_route;
        Ok(())
    }

    /// Forces the tracker to idle. Any in-flight recalculation becomes stale
    /// and will be rejected when it arrives.
    pub fn clear_destination(&mut self) {
        self.destination = None;
        self.route = Route::empty();
        self.recalc_deadline = None;
        self.arrival_deadline = None;
    }

    pub fn phase(&self, now: Instant) -> Phase {
        if let Some(deadline) = self.arrival_deadline {
            if now < deadline {
                return Phase::Arrived;
            }
        }
        match self.destination {
            None => Phase::Idle,
            Some(_) => {
                if self.recalc_deadline.is_some_and(|deadline| now < deadline) {
                    Phase::Recalculating
                } else {
                    Phase::Tracking
                }
            }
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn destination(&self) -> Option<GeoPoint> {
        self.destination
    }

    pub fn last_position(&self) -> Option<GeoPoint> {
        self.last_position
    }

    pub fn last_bearing(&self) -> f64 {
        self.last_bearing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon)
    }

    fn straight_route() -> Route {
        Route::new(vec![pt(0.0, 0.0), pt(0.0, 0.001), pt(0.0, 0.002)])
    }

    fn tracker_with_route() -> RouteTracker {
        let mut tracker = RouteTracker::new();
        tracker
            .set_destination(pt(0.0, 0.002), straight_route())
            .unwrap();
        tracker
    }

    #[test]
    fn rejects_non_finite_fix() {
        let mut tracker = tracker_with_route();
        let now = Instant::now();
        let err = tracker.on_location_update(pt(f64::NAN, 0.0), now);
        assert!(matches!(err, Err(NavError::InvalidFix)));
        // State unchanged
        assert_eq!(tracker.route().len(), 3);
        assert_eq!(tracker.phase(now), Phase::Tracking);
    }

    #[test]
    fn rejects_empty_initial_route() {
        let mut tracker = RouteTracker::new();
        assert!(matches!(
            tracker.set_destination(pt(0.0, 0.002), Route::empty()),
            Err(NavError::InvalidPath)
        ));
        assert_eq!(tracker.phase(Instant::now()), Phase::Idle);
    }

    #[test]
    fn idle_update_records_position_only() {
        let mut tracker = RouteTracker::new();
        let decision = tracker
            .on_location_update(pt(1.0, 1.0), Instant::now())
            .unwrap();
        assert_eq!(decision, TrackerDecision::default());
        assert_eq!(tracker.last_position(), Some(pt(1.0, 1.0)));
    }

    #[test]
    fn single_point_route_is_a_noop() {
        let mut tracker = RouteTracker::new();
        tracker
            .set_destination(pt(0.0, 0.002), Route::new(vec![pt(0.0, 0.002)]))
            .unwrap();
        let decision = tracker
            .on_location_update(pt(0.0, 0.0), Instant::now())
            .unwrap();
        assert!(decision.recalculate.is_none());
        assert!(!decision.arrived);
        assert!(decision.camera.is_empty());
    }

    #[test]
    fn off_route_fix_requests_recalculation() {
        let mut tracker = tracker_with_route();
        let now = Instant::now();
        // ~55m north of the path
        let decision = tracker.on_location_update(pt(0.0005, 0.001), now).unwrap();

        let request = decision.recalculate.expect("should request recalculation");
        assert_eq!(request.from, pt(0.0005, 0.001));
        assert_eq!(request.to, pt(0.0, 0.002));
        assert_eq!(tracker.phase(now), Phase::Recalculating);
    }

    #[test]
    fn recalculating_reverts_to_tracking_after_cooldown() {
        let mut tracker = tracker_with_route();
        let now = Instant::now();
        tracker.on_location_update(pt(0.0005, 0.001), now).unwrap();

        assert_eq!(tracker.phase(now), Phase::Recalculating);
        // Cooldown lapses with no new route having arrived
        assert_eq!(tracker.phase(now + RECALC_COOLDOWN), Phase::Tracking);
    }

    #[test]
    fn off_route_fix_during_cooldown_still_requests() {
        let mut tracker = tracker_with_route();
        let now = Instant::now();
        tracker.on_location_update(pt(0.0005, 0.001), now).unwrap();

        let later = now + Duration::from_secs(1);
        let decision = tracker.on_location_update(pt(0.0006, 0.001), later).unwrap();
        assert!(decision.recalculate.is_some());
    }

    #[test]
    fn on_route_fix_trims_consumed_portion() {
        let mut tracker = tracker_with_route();
        // ~11m off, nearest the second vertex
        let fix = pt(0.0, 0.0011);
        tracker.on_location_update(fix, Instant::now()).unwrap();

        assert_eq!(tracker.route().points(), &[fix, pt(0.0, 0.002)]);
    }

    #[test]
    fn applies_recalculated_route_for_current_destination() {
        let mut tracker = tracker_with_route();
        let now = Instant::now();
        let request = tracker
            .on_location_update(pt(0.0005, 0.001), now)
            .unwrap()
            .recalculate
            .unwrap();

        let new_route = Route::new(vec![pt(0.0005, 0.001), pt(0.0, 0.002)]);
        tracker
            .apply_recalculated_route(new_route.clone(), request.to)
            .unwrap();
        assert_eq!(tracker.route(), &new_route);
    }

    #[test]
    fn rejects_recalculated_route_after_destination_change() {
        let mut tracker = tracker_with_route();
        let now = Instant::now();
        let request = tracker
            .on_location_update(pt(0.0005, 0.001), now)
            .unwrap()
            .recalculate
            .unwrap();

        // User picks a new destination while the request is in flight
        tracker
            .set_destination(pt(0.01, 0.01), Route::new(vec![pt(0.0, 0.0), pt(0.01, 0.01)]))
            .unwrap();

        let late_response = Route::new(vec![pt(0.0005, 0.001), pt(0.0, 0.002)]);
        assert!(matches!(
            tracker.apply_recalculated_route(late_response, request.to),
            Err(NavError::StaleRecalculation)
        ));
    }

    #[test]
    fn rejects_recalculated_route_after_clear() {
        let mut tracker = tracker_with_route();
        let request = tracker
            .on_location_update(pt(0.0005, 0.001), Instant::now())
            .unwrap()
            .recalculate
            .unwrap();

        tracker.clear_destination();
        assert!(matches!(
            tracker.apply_recalculated_route(straight_route(), request.to),
            Err(NavError::StaleRecalculation)
        ));
    }

    #[test]
    fn rejects_empty_recalculated_route() {
        let mut tracker = tracker_with_route();
        let destination = tracker.destination().unwrap();
        assert!(matches!(
            tracker.apply_recalculated_route(Route::empty(), destination),
            Err(NavError::InvalidPath)
        ));
        // The previous route survives
        assert_eq!(tracker.route().len(), 3);
    }

    #[test]
    fn late_response_after_cooldown_still_applies() {
        let mut tracker = tracker_with_route();
        let now = Instant::now();
        let request = tracker
            .on_location_update(pt(0.0005, 0.001), now)
            .unwrap()
            .recalculate
            .unwrap();

        // Response lands well after the cooldown; destination unchanged
        let replacement = Route::new(vec![pt(0.0005, 0.001), pt(0.0, 0.002)]);
        tracker
            .apply_recalculated_route(replacement.clone(), request.to)
            .unwrap();
        assert_eq!(tracker.route(), &replacement);
    }

    #[test]
    fn arrival_clears_route_and_destination() {
        let mut tracker = tracker_with_route();
        let now = Instant::now();
        // ~5.5m short of the destination
        let decision = tracker.on_location_update(pt(0.0, 0.0020005), now).unwrap();

        assert!(decision.arrived);
        assert!(decision.camera.is_empty());
        assert!(tracker.route().is_empty());
        assert_eq!(tracker.destination(), None);
        assert_eq!(tracker.phase(now), Phase::Arrived);
        assert_eq!(tracker.phase(now + ARRIVAL_DISPLAY), Phase::Idle);
    }

    #[test]
    fn updates_after_arrival_are_noops() {
        let mut tracker = tracker_with_route();
        let now = Instant::now();
        tracker.on_location_update(pt(0.0, 0.0020005), now).unwrap();

        let later = now + Duration::from_secs(10);
        let decision = tracker.on_location_update(pt(0.0, 0.003), later).unwrap();
        assert!(decision.recalculate.is_none());
        assert!(!decision.arrived);
        assert!(decision.camera.is_empty());
    }

    #[test]
    fn bearing_command_only_on_large_change() {
        let mut tracker = tracker_with_route();
        let now = Instant::now();

        // First fix: no prior position, so no bearing command
        let first = tracker.on_location_update(pt(0.0, 0.0001), now).unwrap();
        assert!(first
            .camera
            .iter()
            .all(|cmd| !matches!(cmd, CameraCommand::Bearing { .. })));

        // Heading east: bearing ~90, far from the initial 0
        let second = tracker
            .on_location_update(pt(0.0, 0.0003), now + Duration::from_secs(1))
            .unwrap();
        let Some(CameraCommand::Bearing { degrees }) = second
            .camera
            .iter()
            .find(|cmd| matches!(cmd, CameraCommand::Bearing { .. }))
        else {
            panic!("expected a bearing command");
        };
        assert!((*degrees + 90.0).abs() < 1.0, "map rotates against travel bearing");
        assert!((tracker.last_bearing() - 90.0).abs() < 1.0);

        // Still heading east: within hysteresis, no new bearing command
        let third = tracker
            .on_location_update(pt(0.0, 0.0005), now + Duration::from_secs(2))
            .unwrap();
        assert!(third
            .camera
            .iter()
            .all(|cmd| !matches!(cmd, CameraCommand::Bearing { .. })));
    }

    #[test]
    fn tracking_updates_emit_center_command() {
        let mut tracker = tracker_with_route();
        let decision = tracker
            .on_location_update(pt(0.0, 0.0001), Instant::now())
            .unwrap();
        assert!(decision.camera.iter().any(|cmd| matches!(
            cmd,
            CameraCommand::Center {
                zoom: TRACKING_ZOOM,
                animate: true,
                ..
            }
        )));
    }

    #[test]
    fn set_destination_replaces_state_atomically() {
        let mut tracker = tracker_with_route();
        let now = Instant::now();
        tracker.on_location_update(pt(0.0005, 0.001), now).unwrap();
        assert_eq!(tracker.phase(now), Phase::Recalculating);

        let replacement = Route::new(vec![pt(1.0, 1.0), pt(1.0, 1.001)]);
        tracker
            .set_destination(pt(1.0, 1.001), replacement.clone())
            .unwrap();

        assert_eq!(tracker.phase(now), Phase::Tracking);
        assert_eq!(tracker.route(), &replacement);
        assert_eq!(tracker.destination(), Some(pt(1.0, 1.001)));
    }

    #[test]
    fn user_reposition_behaves_like_location_update() {
        let mut tracker = tracker_with_route();
        let decision = tracker
            .user_repositioned(pt(0.0005, 0.001), Instant::now())
            .unwrap();
        assert!(decision.recalculate.is_some());
    }
}
