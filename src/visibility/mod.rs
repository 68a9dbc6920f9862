// Confetti - A wedding media-sharing gallery
// Copyright (C) 2026 Confetti Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Visibility tracker
//!
//! Decides which gallery anchors are close enough to the viewport to render
//! at full fidelity. The tracker performs no observation itself: the UI owns
//! the platform observer and forwards intersection reports over IPC, which
//! also means reports arrive asynchronously and in no guaranteed order
//! relative to registration.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Default proximity margin around the viewport, in pixels
const DEFAULT_PROXIMITY_MARGIN_PX: u32 = 200;

/// Tracker construction options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Extra margin around the viewport within which an anchor still counts
    /// as near enough to preload
    pub proximity_margin_px: u32,

    /// Intersection ratio at which the UI observer reports
    pub threshold: f64,

    /// Keep anchors visible once seen instead of revoking visibility when
    /// they scroll back out of range
    pub keep_visible: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            proximity_margin_px: DEFAULT_PROXIMITY_MARGIN_PX,
            threshold: 0.0,
            keep_visible: true,
        }
    }
}

/// Tracks which anchored entries are currently (or were once) visible
pub struct VisibilityTracker {
    config: TrackerConfig,
    anchors: HashMap<String, String>,
    visible: HashSet<String>,
    previously_visible: HashSet<String>,
}

impl VisibilityTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            anchors: HashMap::new(),
            visible: HashSet::new(),
            previously_visible: HashSet::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Begin observing `element` under `id`.
    ///
    /// Registering an id already marked visible is a no-op; registering an
    /// id that is no longer tracked re-observes it.
    pub fn register_anchor(&mut self, id: &str, element: &str) {
        if id.is_empty() || element.is_empty() {
            return;
        }
        if self.visible.contains(id) {
            return;
        }
        self.anchors.insert(id.to_string(), element.to_string());
    }

    /// Record an intersection report for `id`.
    ///
    /// Entering marks the id visible. Leaving does nothing in `keep_visible`
    /// mode; otherwise visibility is revoked and the id moves to the
    /// previously-visible history. Reports for ids that were never observed
    /// are ignored.
    pub fn record_intersection(&mut self, id: &str, intersecting: bool) {
        if !self.anchors.contains_key(id) && !self.visible.contains(id) {
            return;
        }

        if intersecting {
            self.visible.insert(id.to_string());
        } else if !self.config.keep_visible {
            self.visible.remove(id);
            self.previously_visible.insert(id.to_string());
        }
    }

    /// True iff the most recent report for `id` marked it intersecting
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    /// True iff `id` was visible once and has since left the viewport
    /// (history is only recorded when `keep_visible` is off)
    pub fn was_visible(&self, id: &str) -> bool {
        self.previously_visible.contains(id)
    }

    /// Stop observing `id`; safe on unknown ids. Visibility state already
    /// recorded for the id is kept.
    pub fn unregister(&mut self, id: &str) {
        self.anchors.remove(id);
    }

    /// Release every anchor and all visibility state (the equivalent of
    /// disconnecting the underlying observer)
    pub fn reset(&mut self) {
        self.anchors.clear();
        self.visible.clear();
        self.previously_visible.clear();
    }

    /// Ids currently marked visible
    pub fn visible_ids(&self) -> Vec<String> {
        self.visible.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_tracker() -> VisibilityTracker {
        // The gallery list's configuration: revoke visibility on leave.
        VisibilityTracker::new(TrackerConfig {
            proximity_margin_px: 400,
            threshold: 0.0,
            keep_visible: false,
        })
    }

    #[test]
    fn entering_the_viewport_marks_an_anchor_visible() {
        let mut tracker = VisibilityTracker::new(TrackerConfig::default());
        tracker.register_anchor("media-1", "card-1");

        assert!(!tracker.is_visible("media-1"));
        tracker.record_intersection("media-1", true);
        assert!(tracker.is_visible("media-1"));
    }

    #[test]
    fn keep_visible_mode_never_revokes() {
        let mut tracker = VisibilityTracker::new(TrackerConfig::default());
        tracker.register_anchor("media-1", "card-1");
        tracker.record_intersection("media-1", true);

        tracker.record_intersection("media-1", false);
        assert!(tracker.is_visible("media-1"));
        assert!(!tracker.was_visible("media-1"));
    }

    #[test]
    fn leaving_revokes_and_records_history_in_lazy_mode() {
        let mut tracker = lazy_tracker();
        tracker.register_anchor("media-1", "card-1");
        tracker.record_intersection("media-1", true);

        tracker.record_intersection("media-1", false);
        assert!(!tracker.is_visible("media-1"));
        assert!(tracker.was_visible("media-1"));

        // History sticks even after the anchor comes back and leaves again.
        tracker.record_intersection("media-1", true);
        tracker.record_intersection("media-1", false);
        assert!(tracker.was_visible("media-1"));
    }

    #[test]
    fn registering_a_visible_anchor_is_a_no_op() {
        let mut tracker = lazy_tracker();
        tracker.register_anchor("media-1", "card-1");
        tracker.record_intersection("media-1", true);

        tracker.register_anchor("media-1", "card-1-remounted");
        assert!(tracker.is_visible("media-1"));
        assert_eq!(tracker.anchors.get("media-1").unwrap(), "card-1");
    }

    #[test]
    fn an_untracked_anchor_can_be_reobserved() {
        let mut tracker = lazy_tracker();
        tracker.register_anchor("media-1", "card-1");
        tracker.unregister("media-1");

        tracker.register_anchor("media-1", "card-1-remounted");
        tracker.record_intersection("media-1", true);
        assert!(tracker.is_visible("media-1"));
    }

    #[test]
    fn reports_for_unknown_ids_are_ignored() {
        let mut tracker = lazy_tracker();
        tracker.record_intersection("never-registered", true);
        assert!(!tracker.is_visible("never-registered"));
    }

    #[test]
    fn unregister_is_safe_on_unknown_ids() {
        let mut tracker = lazy_tracker();
        tracker.unregister("never-registered");
    }

    #[test]
    fn reset_releases_everything() {
        let mut tracker = lazy_tracker();
        tracker.register_anchor("media-1", "card-1");
        tracker.record_intersection("media-1", true);
        tracker.record_intersection("media-1", false);

        tracker.reset();
        assert!(!tracker.is_visible("media-1"));
        assert!(!tracker.was_visible("media-1"));
        assert!(tracker.visible_ids().is_empty());
    }
}
