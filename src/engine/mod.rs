// src/engine/mod.rs

//! Orchestration engine for htmlsplice.
//!
//! This module ties together:
//! - the rebuild scheduler (at most one build in flight, changes coalesced)
//! - the main runtime event loop that reacts to:
//!   - source-tree and template change batches
//!   - build completion events
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::types::WatchTarget;
use crate::watch::ChangeEvent;

/// Result of one build, as reported to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Success,
    Failed(String),
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Success)
    }
}

/// Why a rebuild was requested outside of a change batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// The unconditional first build at startup.
    Startup,
    /// Explicit request (tests, future manual trigger).
    Manual,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once no build is in flight or pending.
    /// Live mode never sets this; tests use it to end the loop.
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from watchers, builds and signals.
///
/// This channel is the single ingress point of the orchestrator.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A batch of filesystem changes from one watched target.
    Changes {
        target: WatchTarget,
        events: Vec<ChangeEvent>,
    },
    /// Rebuild regardless of changes.
    RebuildRequested { reason: TriggerReason },
    /// A dispatched build finished (successfully or not).
    BuildCompleted { build_id: u64, outcome: BuildOutcome },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod runtime;
pub mod scheduler;

pub use self::core::{CoreCommand, CoreRuntime, CoreStep};
pub use runtime::{RunSummary, Runtime};
pub use scheduler::{PendingChange, PendingState, RebuildScheduler, ScheduledBuild, SchedulerState};
