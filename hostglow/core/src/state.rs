//! Shared Monitor State
//!
//! The single aggregate shared between the poller and the renderer.
//!
//! ```text
//! ┌──────────────── MonitorState ────────────────┐
//! │  hosts  (RwLock)        events (RwLock)      │
//! │  ├─ records             ├─ EventBook         │
//! │  └─ StateDiffer         └─ celebration latch │
//! └──────────────────────────────────────────────┘
//!      ▲ write (poller)          ▲ read (renderer)
//! ```
//!
//! Lock order is always hosts → events. A poll cycle holds both write locks
//! for the diff, the event inserts, the sweep and the record replacement, so
//! a reader never sees new records with old events or the reverse.

use std::time::Instant;

use parking_lot::RwLock;

use crate::differ::{CelebrationChange, StateDiffer};
use crate::events::{AnimationEvent, AnimationKind, EventDetail};
use crate::host::{HostExport, HostObservation, HostRecord, HostState};
use crate::store::EventBook;

/// Host section guarded by one lock
#[derive(Debug, Default)]
struct HostTable {
    records: Vec<HostRecord>,
    differ: StateDiffer,
}

/// Consistent copy of everything a frame needs
#[derive(Clone, Debug, Default)]
pub struct FrameSnapshot {
    /// Hosts in grid order
    pub hosts: Vec<HostRecord>,
    /// Live events in rendering order
    pub events: Vec<AnimationEvent>,
    /// Start of the latched celebration, if any
    pub celebration: Option<Instant>,
}

impl FrameSnapshot {
    /// Current cell of a host
    #[must_use]
    pub fn cell_of(&self, name: &str) -> Option<usize> {
        self.hosts
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.cell_index)
    }

    /// Current state of a host
    #[must_use]
    pub fn state_of(&self, name: &str) -> Option<HostState> {
        self.hosts.iter().find(|h| h.name == name).map(|h| h.state)
    }
}

/// What one applied poll changed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollSummary {
    /// Hosts in the new record set
    pub hosts: usize,
    /// Kinds of the events created by this poll, in detection order
    pub new_events: Vec<AnimationKind>,
    /// Events removed by the TTL sweep
    pub swept: usize,
    /// Celebration latch update
    pub celebration: CelebrationChange,
}

/// Host records, differ history and in-flight events
#[derive(Debug, Default)]
pub struct MonitorState {
    hosts: RwLock<HostTable>,
    events: RwLock<EventBook>,
}

impl MonitorState {
    /// Create an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a successful poll as one atomic step
    pub fn apply_poll(&self, observations: Vec<HostObservation>, now: Instant) -> PollSummary {
        let mut hosts = self.hosts.write();
        let mut events = self.events.write();

        let table = &mut *hosts;
        let active = events.celebration().is_some();
        let outcome = table.differ.diff(observations, &table.records, active, now);

        let new_events = outcome.events.iter().map(AnimationEvent::kind).collect();
        for event in outcome.events {
            events.insert(event);
        }

        match outcome.celebration {
            CelebrationChange::Start => events.start_celebration(now),
            CelebrationChange::Clear => events.clear_celebration(),
            CelebrationChange::Unchanged => {}
        }

        let swept = events.sweep(now);
        table.records = outcome.records;

        PollSummary {
            hosts: table.records.len(),
            new_events,
            swept,
            celebration: outcome.celebration,
        }
    }

    /// Synthesize an event of `kind` without waiting for a poll
    ///
    /// Targets the first host in grid order. Returns the targeted host name,
    /// or `None` when there is no host to target. Celebration needs no host
    /// and always succeeds.
    pub fn inject(&self, kind: AnimationKind, now: Instant) -> Option<String> {
        let hosts = self.hosts.read();
        let mut events = self.events.write();

        if kind == AnimationKind::Celebration {
            events.start_celebration(now);
            return Some(String::from("*"));
        }

        let target = hosts.records.first()?;
        let detail = match kind {
            AnimationKind::Supernova => EventDetail::Supernova { prev: HostState::Ok },
            AnimationKind::Phoenix => EventDetail::Phoenix {
                prev: HostState::Crit,
            },
            AnimationKind::Warning => EventDetail::Warning,
            AnimationKind::Blackhole => EventDetail::Blackhole { position: 0 },
            AnimationKind::Spawn => EventDetail::Spawn { position: 0 },
            AnimationKind::Celebration => return None,
        };

        events.insert(AnimationEvent::new(&target.name, detail, 0, now));
        Some(target.name.clone())
    }

    /// Consistent copy of hosts, events and the celebration latch
    #[must_use]
    pub fn snapshot(&self) -> FrameSnapshot {
        let hosts = self.hosts.read();
        let events = self.events.read();
        FrameSnapshot {
            hosts: hosts.records.clone(),
            events: events.snapshot(),
            celebration: events.celebration(),
        }
    }

    /// Current host records in grid order
    #[must_use]
    pub fn host_snapshot(&self) -> Vec<HostRecord> {
        self.hosts.read().records.clone()
    }

    /// Plain `{name, state}` export of the current hosts
    #[must_use]
    pub fn export(&self) -> Vec<HostExport> {
        self.hosts.read().records.iter().map(HostExport::from).collect()
    }

    /// Host occupying a cell
    #[must_use]
    pub fn host_at(&self, cell: usize) -> Option<String> {
        self.hosts
            .read()
            .records
            .iter()
            .find(|r| r.cell_index == cell)
            .map(|r| r.name.clone())
    }

    /// Cell occupied by a host
    #[must_use]
    pub fn cell_of(&self, name: &str) -> Option<usize> {
        self.hosts
            .read()
            .records
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.cell_index)
    }

    /// Number of live events
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    /// Start of the latched celebration, if any
    #[must_use]
    pub fn celebration(&self) -> Option<Instant> {
        self.events.read().celebration()
    }
}
