//! State Differ
//!
//! Compares each successful poll against what was seen before and turns the
//! differences into animation events.
//!
//! # Transition Rules
//!
//! Previous state defaults to OK for hosts never seen (or purged):
//!
//! ```text
//! now   previous      event
//! ───── ───────────── ─────────────────
//! CRIT  anything≠CRIT Supernova(prev)
//! OK    > OK          Phoenix(prev)
//! WARN  OK            Warning
//! ```
//!
//! After placement, the host set is compared with the previous poll's:
//! vanished hosts become blackholes at their old cell and lose their
//! remembered state, new hosts spawn at their new cell. The very first
//! poll (nothing known yet) only establishes the baseline.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Instant;

use crate::events::{AnimationEvent, EventDetail};
use crate::host::{HostObservation, HostRecord, HostState};
use crate::priority::{category_color, priority_of, sort_by_priority};

/// What the celebration latch should do after a diff
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CelebrationChange {
    /// Leave the latch as it is
    Unchanged,
    /// Start a celebration now
    Start,
    /// Clear the active celebration
    Clear,
}

/// Result of diffing one poll
#[derive(Clone, Debug)]
pub struct DiffOutcome {
    /// Host records in grid order, replacing the previous set
    pub records: Vec<HostRecord>,
    /// Events to insert into the store
    pub events: Vec<AnimationEvent>,
    /// Celebration latch update
    pub celebration: CelebrationChange,
}

/// Bookkeeping carried between polls
#[derive(Clone, Debug, Default)]
pub struct StateDiffer {
    previous: HashMap<String, HostState>,
    known: BTreeSet<String>,
    had_problems: bool,
}

impl StateDiffer {
    /// Create a differ with no history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last state recorded for a host, if it is remembered
    #[must_use]
    pub fn previous_state(&self, name: &str) -> Option<HostState> {
        self.previous.get(name).copied()
    }

    /// Names seen in the last successful poll
    pub fn known_hosts(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(String::as_str)
    }

    /// Whether any host has been non-OK since the differ was created
    #[must_use]
    pub fn had_problems(&self) -> bool {
        self.had_problems
    }

    /// Diff a poll result against the stored history
    ///
    /// `prior` is the record set from the previous cycle (used to find where
    /// vanished hosts used to be). Duplicate names keep their first occurrence.
    pub fn diff(
        &mut self,
        observations: Vec<HostObservation>,
        prior: &[HostRecord],
        celebration_active: bool,
        now: Instant,
    ) -> DiffOutcome {
        let mut seen = HashSet::new();
        let mut hosts: Vec<HostObservation> = observations
            .into_iter()
            .filter(|h| seen.insert(h.name.clone()))
            .collect();
        sort_by_priority(&mut hosts);

        let records: Vec<HostRecord> = hosts
            .into_iter()
            .enumerate()
            .map(|(cell_index, h)| HostRecord {
                priority: priority_of(&h.name),
                category_color: category_color(&h.name),
                name: h.name,
                state: h.state,
                cell_index,
            })
            .collect();

        let mut events = Vec::new();

        for record in &records {
            let prev = self
                .previous
                .insert(record.name.clone(), record.state)
                .unwrap_or(HostState::Ok);

            let detail = match (record.state, prev) {
                (HostState::Crit, p) if p != HostState::Crit => Some(EventDetail::Supernova { prev }),
                (HostState::Ok, p) if p > HostState::Ok => Some(EventDetail::Phoenix { prev }),
                (HostState::Warn, HostState::Ok) => Some(EventDetail::Warning),
                _ => None,
            };

            if let Some(detail) = detail {
                tracing::debug!(
                    host = %record.name,
                    from = %prev,
                    to = %record.state,
                    kind = %detail.kind(),
                    "State transition"
                );
                events.push(AnimationEvent::new(&record.name, detail, record.priority, now));
            }
        }

        let current: BTreeSet<String> = records.iter().map(|r| r.name.clone()).collect();

        if !self.known.is_empty() {
            for name in self.known.difference(&current) {
                let position = prior
                    .iter()
                    .find(|r| &r.name == name)
                    .map_or(0, |r| r.cell_index);
                self.previous.remove(name);
                tracing::info!(host = %name, position, "Host disappeared");
                events.push(AnimationEvent::new(
                    name,
                    EventDetail::Blackhole { position },
                    priority_of(name),
                    now,
                ));
            }

            for record in records.iter().filter(|r| !self.known.contains(&r.name)) {
                tracing::info!(host = %record.name, position = record.cell_index, "Host appeared");
                events.push(AnimationEvent::new(
                    &record.name,
                    EventDetail::Spawn {
                        position: record.cell_index,
                    },
                    record.priority,
                    now,
                ));
            }
        }

        self.known = current;

        let celebration = self.celebration_change(&records, celebration_active);

        DiffOutcome {
            records,
            events,
            celebration,
        }
    }

    fn celebration_change(&mut self, records: &[HostRecord], active: bool) -> CelebrationChange {
        if records.is_empty() {
            return CelebrationChange::Unchanged;
        }

        if records.iter().all(|r| r.state == HostState::Ok) {
            if self.had_problems && !active {
                tracing::info!(hosts = records.len(), "All hosts OK again");
                return CelebrationChange::Start;
            }
            return CelebrationChange::Unchanged;
        }

        self.had_problems = true;
        if active {
            CelebrationChange::Clear
        } else {
            CelebrationChange::Unchanged
        }
    }
}
