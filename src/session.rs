//! Navigation session orchestration.
//!
//! `NavigationSession` wires the tracker to its collaborators: it fetches
//! routes, owns the location subscription and wake lock for the lifetime of
//! active tracking, applies camera instructions to the rendering adapter,
//! and turns failures into non-blocking [`Notice`]s instead of errors.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{NavError, NavResult};
use crate::geo::GeoPoint;
use crate::location::LocationSubscription;
use crate::tracker::{CameraCommand, Phase, RouteTracker, TRACKING_ZOOM, TrackerDecision};
use crate::traits::{LocationSource, MapCamera, RouteProvider, WakeLock};

/// Transient user-facing banners. Non-blocking; never modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Off-route; a fresh route is being fetched.
    Recalculating,
    /// The routing service failed or produced no route.
    RouteUnavailable,
    /// The location watch could not be started.
    LocationUnavailable,
    /// The destination was reached.
    Arrived,
}

pub struct NavigationSession<P, S, C, W> {
    provider: P,
    locations: S,
    camera: C,
    wake_lock: W,
    tracker: RouteTracker,
    subscription: Option<LocationSubscription>,
}

impl<P, S, C, W> NavigationSession<P, S, C, W>
where
    P: RouteProvider,
    S: LocationSource,
    C: MapCamera,
    W: WakeLock,
{
    pub fn new(provider: P, locations: S, camera: C, wake_lock: W) -> Self {
        Self {
            provider,
            locations,
            camera,
            wake_lock,
            tracker: RouteTracker::new(),
            subscription: None,
        }
    }

    /// Starts navigating from `origin` toward `destination`.
    ///
    /// Fetches the initial route, seeds the tracker, starts the location
    /// watch and takes the wake lock. Selecting the destination already
    /// being tracked is a no-op.
    pub fn start_navigation(&mut self, origin: GeoPoint, destination: GeoPoint) -> Vec<Notice> {
        if self.tracker.destination() == Some(destination) {
            return Vec::new();
        }

        let route = match self.provider.route_between(origin, destination) {
            Ok(route) => route,
            Err(err) => {
                warn!(%err, "initial route request failed");
                return vec![Notice::RouteUnavailable];
            }
        };

        if let Err(err) = self.tracker.set_destination(destination, route) {
            warn!(%err, "could not start tracking");
            return vec![Notice::RouteUnavailable];
        }
        info!(%destination, "navigation started");

        let mut notices = Vec::new();
        if self.subscription.is_none() {
            match self.locations.subscribe() {
                Ok(subscription) => self.subscription = Some(subscription),
                Err(err) => {
                    warn!(%err, "location watch failed to start");
                    notices.push(Notice::LocationUnavailable);
                }
            }
        }

        if !self.wake_lock.acquire() {
            debug!("wake lock unavailable");
        }
        self.camera.set_center(origin, TRACKING_ZOOM, true);
        notices
    }

    /// Drains pending fixes from the location subscription.
    pub fn pump(&mut self, now: Instant) -> Vec<Notice> {
        let mut fixes = Vec::new();
        if let Some(subscription) = &self.subscription {
            while let Some(fix) = subscription.try_next() {
                fixes.push(fix);
            }
        }

        let mut notices = Vec::new();
        for fix in fixes {
            notices.extend(self.on_fix(fix, now));
        }
        notices
    }

    /// Processes a single location fix.
    pub fn on_fix(&mut self, position: GeoPoint, now: Instant) -> Vec<Notice> {
        let result = self.tracker.on_location_update(position, now);
        self.process(position, result)
    }

    /// Marker-drag repositioning; same pipeline as a live fix.
    pub fn user_repositioned(&mut self, position: GeoPoint, now: Instant) -> Vec<Notice> {
        let result = self.tracker.user_repositioned(position, now);
        self.process(position, result)
    }

    /// Stops tracking: clears the tracker, cancels the location watch and
    /// releases the wake lock. A recalculation still in flight becomes stale
    /// and is dropped when it lands.
    pub fn clear_destination(&mut self) {
        self.tracker.clear_destination();
        self.stop_tracking();
    }

    /// The platform may silently revoke the wake lock while backgrounded;
    /// re-acquire when the app becomes visible again mid-tracking.
    pub fn on_visibility_regained(&mut self) {
        if self.tracker.destination().is_some() && !self.wake_lock.is_held() {
            self.wake_lock.acquire();
        }
    }

    pub fn tracker(&self) -> &RouteTracker {
        &self.tracker
    }

    pub fn phase(&self, now: Instant) -> Phase {
        self.tracker.phase(now)
    }

    fn process(&mut self, position: GeoPoint, result: NavResult<TrackerDecision>) -> Vec<Notice> {
        let decision = match result {
            Ok(decision) => decision,
            Err(NavError::InvalidFix) => {
                warn!("ignoring invalid GPS fix");
                return Vec::new();
            }
            Err(err) => {
                warn!(%err, "location update failed");
                return Vec::new();
            }
        };

        if self.tracker.destination().is_none() && !decision.arrived {
            // Idle: just follow the user on the map
            self.camera.pan_to(position);
            return Vec::new();
        }

        let mut notices = Vec::new();
        self.apply_camera(&decision.camera);

        if let Some(request) = decision.recalculate {
            notices.push(Notice::Recalculating);
            match self.provider.route_between(request.from, request.to) {
                Ok(new_route) => {
                    match self.tracker.apply_recalculated_route(new_route, request.to) {
                        Ok(()) => {}
                        Err(NavError::StaleRecalculation) => {
                            debug!("stale recalculation response dropped");
                        }
                        Err(err) => warn!(%err, "recalculated route rejected"),
                    }
                }
                Err(err) => {
                    // Keep showing the last good route
                    warn!(%err, "route recalculation failed");
                    notices.push(Notice::RouteUnavailable);
                }
            }
        }

        if decision.arrived {
            info!("destination reached");
            notices.push(Notice::Arrived);
            self.stop_tracking();
        }

        notices
    }

    fn apply_camera(&mut self, commands: &[CameraCommand]) {
        for command in commands {
            match *command {
                CameraCommand::Center {
                    position,
                    zoom,
                    animate,
                } => self.camera.set_center(position, zoom, animate),
                CameraCommand::Bearing { degrees } => self.camera.set_bearing(degrees),
            }
        }
    }

    fn stop_tracking(&mut self) {
        // Dropping the subscription cancels the platform watch exactly once
        self.subscription = None;
        self.wake_lock.release();
    }
}
