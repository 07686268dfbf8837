//! Popup lifecycle state machine
//!
//! Tracks which marker's popup is open, decides whether to restore it after
//! a data reload, and arms a short suppress-refetch guard so the programmatic
//! re-anchor pan does not itself trigger another viewport fetch (which would
//! loop forever).
//!
//! Transitions:
//! - closed → open: marker click, capturing the group's coordinate key and
//!   the ids of all records in it at open time.
//! - open → closed: explicit close, click elsewhere, a user pan/zoom outside
//!   the guard window, or a reload whose group at the stored key no longer
//!   shares any record ids.
//! - open → open: a reload whose group at the stored key still contains at
//!   least one stored id re-anchors the popup and arms the guard.

use crate::data::grouping::MarkerGroup;
use instant::Instant;
use std::collections::HashSet;
use std::time::Duration;

/// Guard window during which bounds changes caused by the re-anchor pan are
/// not allowed to schedule a fetch.
pub const SUPPRESS_WINDOW: Duration = Duration::from_millis(600);

/// Result of reconciling an open popup against freshly loaded groups.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupOutcome {
    /// No popup was open; nothing to do.
    Closed,
    /// The stored record set still overlaps the group at the stored key;
    /// the popup should be reopened at this key and the map re-centered.
    Reanchored(String),
    /// The location's contents changed entirely; the popup was discarded.
    Dismissed,
}

#[derive(Debug)]
struct OpenPopup {
    key: String,
    record_ids: HashSet<String>,
    carousel: usize,
}

/// State machine for the single open popup.
#[derive(Debug, Default)]
pub struct PopupTracker {
    open: Option<OpenPopup>,
    suppress_until: Option<Instant>,
}

impl PopupTracker {
    /// closed → open on marker click.
    pub fn open(&mut self, key: impl Into<String>, record_ids: impl IntoIterator<Item = String>) {
        self.open = Some(OpenPopup {
            key: key.into(),
            record_ids: record_ids.into_iter().collect(),
            carousel: 0,
        });
    }

    /// open → closed on explicit user interaction.
    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Coordinate key of the open popup, if any.
    pub fn open_key(&self) -> Option<&str> {
        self.open.as_ref().map(|o| o.key.as_str())
    }

    /// Current carousel position within the open group.
    pub fn carousel(&self) -> usize {
        self.open.as_ref().map(|o| o.carousel).unwrap_or(0)
    }

    /// Step the carousel by `delta`, wrapping within `len` records.
    pub fn step_carousel(&mut self, delta: isize, len: usize) {
        if let Some(open) = &mut self.open
            && len > 0
        {
            let len = len as isize;
            let next = (open.carousel as isize + delta).rem_euclid(len);
            open.carousel = next as usize;
        }
    }

    /// Reconcile the open popup with the groups produced by a data reload.
    ///
    /// Re-anchoring refreshes the stored id set to the new group contents and
    /// arms the suppress-refetch guard, since the caller is expected to pan
    /// the map back to the marker.
    pub fn reconcile(&mut self, groups: &[MarkerGroup], now: Instant) -> PopupOutcome {
        let Some(open) = &mut self.open else {
            return PopupOutcome::Closed;
        };

        let survived = groups
            .iter()
            .find(|g| g.key == open.key)
            .filter(|g| g.records.iter().any(|r| open.record_ids.contains(&r.id)));

        match survived {
            Some(group) => {
                open.record_ids = group.record_ids();
                open.carousel = open.carousel.min(group.records.len().saturating_sub(1));
                self.suppress_until = Some(now + SUPPRESS_WINDOW);
                PopupOutcome::Reanchored(group.key.clone())
            }
            None => {
                self.open = None;
                PopupOutcome::Dismissed
            }
        }
    }

    /// Whether viewport fetches are currently suppressed by the re-anchor
    /// guard.
    pub fn refetch_suppressed(&self, now: Instant) -> bool {
        self.suppress_until.is_some_and(|until| now < until)
    }

    /// A bounds change was observed. Inside the guard window it is the
    /// re-anchor pan and is swallowed; outside it is user-initiated, so the
    /// popup closes and the change may proceed to the fetch path.
    ///
    /// Returns true when the change should schedule a fetch.
    pub fn note_viewport_change(&mut self, now: Instant) -> bool {
        if self.refetch_suppressed(now) {
            return false;
        }
        self.open = None;
        true
    }
}
