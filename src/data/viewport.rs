//! Viewport bounds tracking and fetch debouncing
//!
//! The map plugin reports the visible rectangle every frame; [`BoundsTracker`]
//! turns that stream into discrete "viewport changed" events (with a settle
//! delay on first mount), and [`FetchDebouncer`] coalesces rapid changes into
//! a single delayed request carrying the most recent bounds and flags.
//!
//! All timing goes through explicit [`Instant`] parameters so tests can
//! replay clocks.

use instant::Instant;
use std::time::Duration;

/// Delay before the first bounds emission, letting the map's initial
/// layout and projection stabilize.
pub const MOUNT_SETTLE: Duration = Duration::from_millis(400);

/// Quiescence window of the fetch debouncer.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Tolerance for treating two viewport rectangles as identical, absorbing
/// projection round-trip jitter.
const BOUNDS_EPSILON: f64 = 1e-9;

/// Visible geographic rectangle, edges in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    /// Bounds from two opposite corners given as (latitude, longitude).
    /// `geo::Rect` normalizes min/max, so corner order does not matter.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        let rect = geo::Rect::new(
            geo::Coord { x: a.1, y: a.0 },
            geo::Coord { x: b.1, y: b.0 },
        );
        Self {
            north: rect.max().y,
            south: rect.min().y,
            east: rect.max().x,
            west: rect.min().x,
        }
    }

    /// Whether a coordinate falls inside this rectangle.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        use geo::Intersects;
        self.to_rect().intersects(&geo::Coord {
            x: longitude,
            y: latitude,
        })
    }

    /// Rectangle as a `geo::Rect` with x = longitude, y = latitude.
    pub fn to_rect(&self) -> geo::Rect<f64> {
        geo::Rect::new(
            geo::Coord {
                x: self.west,
                y: self.south,
            },
            geo::Coord {
                x: self.east,
                y: self.north,
            },
        )
    }

    /// Equality up to projection jitter.
    pub fn approx_eq(&self, other: &Bounds) -> bool {
        (self.north - other.north).abs() < BOUNDS_EPSILON
            && (self.south - other.south).abs() < BOUNDS_EPSILON
            && (self.east - other.east).abs() < BOUNDS_EPSILON
            && (self.west - other.west).abs() < BOUNDS_EPSILON
    }
}

/// Turns per-frame viewport observations into change events.
///
/// Emits nothing until [`MOUNT_SETTLE`] has elapsed since construction, then
/// emits once, and afterwards only when the observed rectangle actually
/// differs from the last emitted one.
pub struct BoundsTracker {
    mounted_at: Instant,
    last_emitted: Option<Bounds>,
}

impl BoundsTracker {
    pub fn new(now: Instant) -> Self {
        Self {
            mounted_at: now,
            last_emitted: None,
        }
    }

    /// Observe the current viewport; returns the bounds when they should be
    /// propagated downstream.
    pub fn observe(&mut self, bounds: Bounds, now: Instant) -> Option<Bounds> {
        if now.duration_since(self.mounted_at) < MOUNT_SETTLE {
            return None;
        }
        if let Some(last) = &self.last_emitted
            && last.approx_eq(&bounds)
        {
            return None;
        }
        self.last_emitted = Some(bounds);
        Some(bounds)
    }
}

/// A fetch the debouncer has decided to issue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchRequest {
    pub bounds: Bounds,
    /// Only request records that have images.
    pub image_only: bool,
}

/// Coalesces rapid viewport changes into one delayed request.
///
/// Every [`schedule`](Self::schedule) call restarts the timer; when the
/// window elapses without another call, [`poll`](Self::poll) yields exactly
/// one request carrying the most recent bounds and flag. Requests already
/// issued are never cancelled, so a slow earlier response can still arrive
/// after a newer one.
#[derive(Default)]
pub struct FetchDebouncer {
    pending: Option<FetchRequest>,
    deadline: Option<Instant>,
}

impl FetchDebouncer {
    /// Record a candidate change and restart the quiescence timer.
    pub fn schedule(&mut self, request: FetchRequest, now: Instant) {
        self.pending = Some(request);
        self.deadline = Some(now + DEBOUNCE_WINDOW);
    }

    /// Take the pending request if the quiescence window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<FetchRequest> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Whether a request is waiting for the window to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending request without issuing it.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(n: f64, s: f64, e: f64, w: f64) -> Bounds {
        Bounds {
            north: n,
            south: s,
            east: e,
            west: w,
        }
    }

    #[test]
    fn from_corners_normalizes_edges() {
        let b = Bounds::from_corners((-33.0, 152.0), (-34.0, 150.0));
        assert_eq!(b.north, -33.0);
        assert_eq!(b.south, -34.0);
        assert_eq!(b.east, 152.0);
        assert_eq!(b.west, 150.0);
        assert!(b.contains(-33.5, 151.0));
        assert!(!b.contains(-32.0, 151.0));
    }

    #[test]
    fn tracker_waits_for_mount_settle() {
        let t0 = Instant::now();
        let mut tracker = BoundsTracker::new(t0);
        let b = bounds(-33.0, -34.0, 152.0, 150.0);

        assert_eq!(tracker.observe(b, t0), None);
        assert_eq!(tracker.observe(b, t0 + Duration::from_millis(100)), None);
        assert_eq!(tracker.observe(b, t0 + MOUNT_SETTLE), Some(b));
    }

    #[test]
    fn tracker_dedupes_identical_bounds() {
        let t0 = Instant::now();
        let mut tracker = BoundsTracker::new(t0);
        let b = bounds(-33.0, -34.0, 152.0, 150.0);
        let later = t0 + MOUNT_SETTLE + Duration::from_secs(1);

        assert_eq!(tracker.observe(b, later), Some(b));
        assert_eq!(tracker.observe(b, later + Duration::from_secs(1)), None);

        let jittered = bounds(-33.0 + 1e-12, -34.0, 152.0, 150.0);
        assert_eq!(tracker.observe(jittered, later + Duration::from_secs(2)), None);

        let moved = bounds(-32.0, -33.0, 152.0, 150.0);
        assert_eq!(
            tracker.observe(moved, later + Duration::from_secs(3)),
            Some(moved)
        );
    }

    #[test]
    fn burst_of_changes_yields_one_request_with_final_bounds() {
        let t0 = Instant::now();
        let mut debouncer = FetchDebouncer::default();

        for i in 0..10 {
            let req = FetchRequest {
                bounds: bounds(-33.0 - i as f64, -34.0 - i as f64, 152.0, 150.0),
                image_only: true,
            };
            debouncer.schedule(req, t0 + Duration::from_millis(i * 40));
            // Still inside the window: nothing fires.
            assert_eq!(debouncer.poll(t0 + Duration::from_millis(i * 40 + 1)), None);
        }

        let last_scheduled = t0 + Duration::from_millis(9 * 40);
        let fired = debouncer.poll(last_scheduled + DEBOUNCE_WINDOW).unwrap();
        assert_eq!(fired.bounds.north, -42.0);
        assert!(fired.image_only);

        // Exactly one request per quiescent period.
        assert_eq!(debouncer.poll(last_scheduled + DEBOUNCE_WINDOW * 2), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn cancel_pending_drops_the_request() {
        let t0 = Instant::now();
        let mut debouncer = FetchDebouncer::default();
        debouncer.schedule(
            FetchRequest {
                bounds: bounds(1.0, 0.0, 1.0, 0.0),
                image_only: false,
            },
            t0,
        );
        debouncer.cancel_pending();
        assert_eq!(debouncer.poll(t0 + DEBOUNCE_WINDOW), None);
    }
}
