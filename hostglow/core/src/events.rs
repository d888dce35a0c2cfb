//! Animation Events
//!
//! A transition detected by the differ (or injected by a manual trigger)
//! becomes an [`AnimationEvent`]. Each event carries exactly the data its
//! animation needs, so the renderer never has to consult side tables.
//!
//! ```text
//! kind        ttl    data
//! ─────────── ────── ─────────────────────────
//! Supernova   14 s   prev state, live cell
//! Phoenix      6 s   prev state, live cell
//! Warning      4 s   live cell
//! Blackhole    5 s   captured position
//! Spawn        4 s   captured position
//! Celebration  n/a   global flag, not stored per host
//! ```

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::host::HostState;

/// Kinds of animation, in rendering order
///
/// The derived `Ord` is the overlap resolution order: when two events paint
/// the same cell, the later kind wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    /// A host went critical
    Supernova,
    /// A host recovered to OK
    Phoenix,
    /// A host went from OK to warning
    Warning,
    /// A host disappeared from the inventory
    Blackhole,
    /// A host appeared in the inventory
    Spawn,
    /// Every host is OK again after a problem
    Celebration,
}

impl AnimationKind {
    /// Every kind, in rendering order
    pub const ALL: [Self; 6] = [
        Self::Supernova,
        Self::Phoenix,
        Self::Warning,
        Self::Blackhole,
        Self::Spawn,
        Self::Celebration,
    ];

    /// How long an event of this kind stays in the store
    ///
    /// Celebration is a latched flag rather than a stored event and has no TTL.
    #[must_use]
    pub const fn ttl(self) -> Option<Duration> {
        match self {
            Self::Supernova => Some(Duration::from_secs(14)),
            Self::Phoenix => Some(Duration::from_secs(6)),
            Self::Warning => Some(Duration::from_secs(4)),
            Self::Blackhole => Some(Duration::from_secs(5)),
            Self::Spawn => Some(Duration::from_secs(4)),
            Self::Celebration => None,
        }
    }

    /// Lowercase identifier used for trigger names and logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Supernova => "supernova",
            Self::Phoenix => "phoenix",
            Self::Warning => "warning",
            Self::Blackhole => "blackhole",
            Self::Spawn => "spawn",
            Self::Celebration => "celebration",
        }
    }

    /// Parse a lowercase identifier
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl std::fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind payload of an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventDetail {
    /// Host went critical from `prev`
    Supernova {
        /// State before the transition
        prev: HostState,
    },
    /// Host recovered from `prev`
    Phoenix {
        /// State before the transition
        prev: HostState,
    },
    /// Host went from OK to warning
    Warning,
    /// Host vanished; animate where it last was
    Blackhole {
        /// Cell index the host occupied before it disappeared
        position: usize,
    },
    /// Host appeared; animate where it was placed
    Spawn {
        /// Cell index assigned to the new host
        position: usize,
    },
}

impl EventDetail {
    /// The animation kind this payload belongs to
    #[must_use]
    pub const fn kind(&self) -> AnimationKind {
        match self {
            Self::Supernova { .. } => AnimationKind::Supernova,
            Self::Phoenix { .. } => AnimationKind::Phoenix,
            Self::Warning => AnimationKind::Warning,
            Self::Blackhole { .. } => AnimationKind::Blackhole,
            Self::Spawn { .. } => AnimationKind::Spawn,
        }
    }
}

/// An in-flight animation for one host
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationEvent {
    /// Host the event belongs to
    pub host: String,
    /// When the animation started
    pub started_at: Instant,
    /// Priority class of the host at detection time
    pub priority: u8,
    /// Kind-specific data
    pub detail: EventDetail,
}

impl AnimationEvent {
    /// Create an event
    pub fn new(host: impl Into<String>, detail: EventDetail, priority: u8, started_at: Instant) -> Self {
        Self {
            host: host.into(),
            started_at,
            priority,
            detail,
        }
    }

    /// Kind of this event
    #[must_use]
    pub const fn kind(&self) -> AnimationKind {
        self.detail.kind()
    }

    /// Time elapsed since the event started (zero if `now` is earlier)
    #[must_use]
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    /// Whether the event has outlived its kind's TTL
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.kind().ttl().is_some_and(|ttl| self.age(now) >= ttl)
    }
}
