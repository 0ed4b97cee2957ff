// src/engine/scheduler.rs

//! The rebuild state machine.
//!
//! ```text
//!            change                 tick (dispatch)
//!   Idle ────────────▶ Dirty ─────────────────────▶ Building
//!    ▲                   ▲                             │
//!    │                   │ completed, change queued    │
//!    │                   └─────────────────────────────┤
//!    │               completed, nothing queued         │
//!    └─────────────────────────────────────────────────┘
//! ```
//!
//! Any number of changes while `Dirty` or `Building` collapse into a single
//! pending change, so each burst yields exactly one follow-up build.

use tracing::{debug, warn};

/// A change waiting to be built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingChange {
    /// The template file changed and must be re-read before building.
    pub reload_template: bool,
}

impl PendingChange {
    pub fn source() -> Self {
        Self {
            reload_template: false,
        }
    }

    pub fn template() -> Self {
        Self {
            reload_template: true,
        }
    }

    fn merge(self, other: PendingChange) -> Self {
        Self {
            reload_template: self.reload_template || other.reload_template,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Dirty(PendingChange),
    Building {
        build_id: u64,
        queued: Option<PendingChange>,
    },
}

/// Flag view of the scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingState {
    pub is_build_in_flight: bool,
    pub has_pending_change: bool,
}

/// A build the scheduler has committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledBuild {
    pub build_id: u64,
    pub reload_template: bool,
}

#[derive(Debug)]
pub struct RebuildScheduler {
    state: SchedulerState,
    next_build_id: u64,
    dispatched: u64,
}

impl Default for RebuildScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RebuildScheduler {
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            next_build_id: 1,
            dispatched: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn pending_state(&self) -> PendingState {
        match self.state {
            SchedulerState::Idle => PendingState {
                is_build_in_flight: false,
                has_pending_change: false,
            },
            SchedulerState::Dirty(_) => PendingState {
                is_build_in_flight: false,
                has_pending_change: true,
            },
            SchedulerState::Building { queued, .. } => PendingState {
                is_build_in_flight: true,
                has_pending_change: queued.is_some(),
            },
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == SchedulerState::Idle
    }

    /// Id of the build currently in flight, if any.
    pub fn in_flight(&self) -> Option<u64> {
        match self.state {
            SchedulerState::Building { build_id, .. } => Some(build_id),
            _ => None,
        }
    }

    /// Total number of builds dispatched so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    pub fn source_changed(&mut self) {
        self.record(PendingChange::source());
    }

    pub fn template_changed(&mut self) {
        self.record(PendingChange::template());
    }

    /// Record a change without dispatching anything.
    pub fn record(&mut self, change: PendingChange) {
        self.state = match self.state {
            SchedulerState::Idle => SchedulerState::Dirty(change),
            SchedulerState::Dirty(pending) => SchedulerState::Dirty(pending.merge(change)),
            SchedulerState::Building { build_id, queued } => SchedulerState::Building {
                build_id,
                queued: Some(queued.map_or(change, |q| q.merge(change))),
            },
        };
        debug!(state = ?self.state, "change recorded");
    }

    /// Mark `build_id` as finished. Returns false (and changes nothing) if it
    /// is not the build in flight.
    pub fn build_completed(&mut self, build_id: u64) -> bool {
        match self.state {
            SchedulerState::Building {
                build_id: current,
                queued,
            } if current == build_id => {
                self.state = match queued {
                    Some(change) => SchedulerState::Dirty(change),
                    None => SchedulerState::Idle,
                };
                debug!(build_id, state = ?self.state, "build completed");
                true
            }
            other => {
                warn!(build_id, state = ?other, "completion for a build that is not in flight; ignoring");
                false
            }
        }
    }

    /// Dispatch a build if one is pending and none is in flight.
    pub fn tick(&mut self) -> Option<ScheduledBuild> {
        let SchedulerState::Dirty(change) = self.state else {
            return None;
        };

        let build = ScheduledBuild {
            build_id: self.next_build_id,
            reload_template: change.reload_template,
        };
        self.next_build_id += 1;
        self.dispatched += 1;
        self.state = SchedulerState::Building {
            build_id: build.build_id,
            queued: None,
        };
        debug!(build_id = build.build_id, reload_template = build.reload_template, "build dispatched");
        Some(build)
    }
}
