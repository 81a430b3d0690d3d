//! Cancellable location subscription.
//!
//! Models a callback-based platform watch API as an explicit subscription:
//! a feed half that the platform (or a test) pushes fixes into, and a
//! subscription half the session drains. Dropping the subscription signals
//! cancellation upstream exactly once.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};

use tracing::debug;

use crate::geo::GeoPoint;

/// Producer half of a location watch.
#[derive(Debug, Clone)]
pub struct LocationFeed {
    sender: Sender<GeoPoint>,
    stop: Arc<AtomicBool>,
}

impl LocationFeed {
    /// Delivers a fix. Returns `false` once the subscription was cancelled,
    /// telling the producer to stop watching.
    pub fn push(&self, fix: GeoPoint) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.sender.send(fix).is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Consumer half of a location watch. Cancels the watch on drop.
#[derive(Debug)]
pub struct LocationSubscription {
    receiver: Receiver<GeoPoint>,
    stop: Arc<AtomicBool>,
}

impl LocationSubscription {
    /// Returns the next pending fix without blocking.
    pub fn try_next(&self) -> Option<GeoPoint> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for LocationSubscription {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        debug!("location watch cancelled");
    }
}

/// Creates a connected feed/subscription pair.
pub fn location_channel() -> (LocationFeed, LocationSubscription) {
    let (sender, receiver) = channel();
    let stop = Arc::new(AtomicBool::new(false));
    (
        LocationFeed {
            sender,
            stop: Arc::clone(&stop),
        },
        LocationSubscription { receiver, stop },
    )
}
