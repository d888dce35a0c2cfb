//! Animation Event Store
//!
//! One ordered map keyed by `(kind, host)` holds every in-flight event, so
//! "at most one live event per kind and host" is a property of the key, not
//! something callers have to maintain. Iteration order is the key order,
//! which makes overlapping animations resolve the same way every frame.
//!
//! The celebration flag lives next to the map because it is global rather
//! than per host.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::events::{AnimationEvent, AnimationKind};

type EventKey = (AnimationKind, String);

/// In-flight animation events plus the celebration latch
#[derive(Clone, Debug, Default)]
pub struct EventBook {
    events: BTreeMap<EventKey, AnimationEvent>,
    celebration: Option<Instant>,
}

impl EventBook {
    /// Create an empty book
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event, replacing any live event of the same kind and host
    ///
    /// Returns the replaced event, if any.
    pub fn insert(&mut self, event: AnimationEvent) -> Option<AnimationEvent> {
        let key = (event.kind(), event.host.clone());
        self.events.insert(key, event)
    }

    /// Look up the live event for a kind and host
    #[must_use]
    pub fn get(&self, kind: AnimationKind, host: &str) -> Option<&AnimationEvent> {
        self.events.get(&(kind, host.to_string()))
    }

    /// Drop every event whose TTL has elapsed at `now`
    ///
    /// Returns the number of events removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.events.len();
        self.events.retain(|_, event| !event.is_expired(now));
        before - self.events.len()
    }

    /// Number of live events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Live events in rendering order
    pub fn iter(&self) -> impl Iterator<Item = &AnimationEvent> {
        self.events.values()
    }

    /// Copy of all live events in rendering order
    #[must_use]
    pub fn snapshot(&self) -> Vec<AnimationEvent> {
        self.events.values().cloned().collect()
    }

    /// When the active celebration started, if one is latched
    #[must_use]
    pub fn celebration(&self) -> Option<Instant> {
        self.celebration
    }

    /// Latch a celebration starting at `now`
    pub fn start_celebration(&mut self, now: Instant) {
        self.celebration = Some(now);
    }

    /// Clear the celebration latch
    pub fn clear_celebration(&mut self) {
        self.celebration = None;
    }
}
