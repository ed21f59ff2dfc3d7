//! Per-zone run state, reconciled against controller status polls.
//!
//! The controller is authoritative: every completed poll replaces local
//! state wholesale. The one exception is an optimistic manual start, which
//! survives a single poll that does not yet show the zone active.

use crate::models::controller::{RunKind, StatusSnapshot, ZoneId};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSource {
    Scheduled,
    Manual,
}

impl RunSource {
    pub fn as_str(self) -> &'static str {
        match self {
            RunSource::Scheduled => "scheduled",
            RunSource::Manual => "manual",
        }
    }
}

impl From<RunKind> for RunSource {
    fn from(kind: RunKind) -> Self {
        match kind {
            RunKind::Scheduled => RunSource::Scheduled,
            RunKind::Manual => RunSource::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneRuntimeState {
    pub active: bool,
    pub remaining_seconds: u32,
    pub source: Option<RunSource>,
}

/// Tracks all zones the dashboard knows about. Zones never present in a
/// status snapshot simply read as idle.
#[derive(Debug, Default)]
pub struct RunStateTracker {
    states: BTreeMap<ZoneId, ZoneRuntimeState>,
    pending_manual: BTreeMap<ZoneId, u32>,
}

impl RunStateTracker {
    pub fn new(zone_ids: impl IntoIterator<Item = ZoneId>) -> Self {
        RunStateTracker {
            states: zone_ids.into_iter().map(|id| (id, ZoneRuntimeState::default())).collect(),
            pending_manual: BTreeMap::new(),
        }
    }

    pub fn state(&self, zone: ZoneId) -> ZoneRuntimeState {
        self.states.get(&zone).copied().unwrap_or_default()
    }

    pub fn states(&self) -> &BTreeMap<ZoneId, ZoneRuntimeState> {
        &self.states
    }

    pub fn has_pending(&self, zone: ZoneId) -> bool {
        self.pending_manual.contains_key(&zone)
    }

    /// Records an accepted manual start optimistically, before the next poll
    /// can confirm it.
    pub fn start_pending(&mut self, zone: ZoneId, duration_seconds: u32) {
        self.pending_manual.insert(zone, duration_seconds);
        let entry = self.states.entry(zone).or_default();
        *entry = ZoneRuntimeState {
            active: true,
            remaining_seconds: duration_seconds,
            source: Some(RunSource::Manual),
        };
    }

    /// Reconciles every tracked zone against a completed status poll. A
    /// pending manual start is consumed here either way: confirmed by an
    /// active report, or dropped after one poll without it.
    pub fn apply_status(&mut self, snapshot: &StatusSnapshot) {
        for (zone, state) in self.states.iter_mut() {
            let pending = self.pending_manual.remove(zone).is_some();
            match snapshot.get(*zone) {
                Some(activity) if activity.active => {
                    let source = match activity.kind {
                        Some(kind) => Some(RunSource::from(kind)),
                        // controllers that omit the run type at least know
                        // whether we just asked for a manual start
                        None if pending => Some(RunSource::Manual),
                        None => Some(RunSource::Scheduled),
                    };
                    *state = ZoneRuntimeState {
                        active: true,
                        remaining_seconds: activity.remaining,
                        source,
                    };
                }
                // the controller may not have registered a just-issued
                // manual start; keep the optimistic state for this one poll
                _ if pending => {}
                _ => *state = ZoneRuntimeState::default(),
            }
        }
    }

    /// A failed poll changes nothing; the last known states stand.
    pub fn apply_poll_failure(&mut self) {}
}
