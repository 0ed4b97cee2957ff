// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from the ingress channel
//! - reloading the template and handing builds to the backend
//! - notifying the viewer
//! - bounding the shutdown drain
//!
//! The core is intended to be unit tested without any Tokio, channels,
//! filesystem, or sockets.

use tracing::{debug, info};

use crate::engine::scheduler::{RebuildScheduler, ScheduledBuild};
use crate::engine::{BuildOutcome, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::types::WatchTarget;
use crate::watch::{ChangeClassifier, ChangeEvent};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Hand this build to the backend.
    DispatchBuild(ScheduledBuild),
    /// A build succeeded; tell the viewer (if any) to reload.
    NotifyReload,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Pure core runtime state.
///
/// This owns:
/// - the rebuild scheduler
/// - the change classifier
/// - the shutdown flag (terminal once set)
#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: RebuildScheduler,
    classifier: ChangeClassifier,
    options: RuntimeOptions,
    shutting_down: bool,
}

impl CoreRuntime {
    pub fn new(classifier: ChangeClassifier, options: RuntimeOptions) -> Self {
        Self {
            scheduler: RebuildScheduler::new(),
            classifier,
            options,
            shutting_down: false,
        }
    }

    pub fn scheduler(&self) -> &RebuildScheduler {
        &self.scheduler
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::Changes { target, events } => self.handle_changes(target, &events),
            RuntimeEvent::RebuildRequested { reason } => self.handle_rebuild_request(reason),
            RuntimeEvent::BuildCompleted { build_id, outcome } => {
                self.handle_completion(build_id, outcome)
            }
            RuntimeEvent::ShutdownRequested => self.handle_shutdown(),
        }
    }

    fn handle_changes(&mut self, target: WatchTarget, events: &[ChangeEvent]) -> CoreStep {
        if self.shutting_down {
            debug!(?target, "shutting down; dropping change batch");
            return CoreStep::running(Vec::new());
        }

        if !self.classifier.is_relevant(target, events) {
            return CoreStep::running(Vec::new());
        }

        match target {
            WatchTarget::Source => {
                if let Some(first) = events.first() {
                    debug!(path = %first.path.display(), batch = events.len(), "detected source change");
                }
                self.scheduler.source_changed();
            }
            WatchTarget::Template => {
                debug!("detected change of HTML template");
                self.scheduler.template_changed();
            }
        }

        CoreStep::running(self.dispatch_if_ready())
    }

    fn handle_rebuild_request(&mut self, reason: TriggerReason) -> CoreStep {
        if self.shutting_down {
            return CoreStep::running(Vec::new());
        }
        debug!(?reason, "rebuild requested");
        self.scheduler.source_changed();
        CoreStep::running(self.dispatch_if_ready())
    }

    fn handle_completion(&mut self, build_id: u64, outcome: BuildOutcome) -> CoreStep {
        if !self.scheduler.build_completed(build_id) {
            return CoreStep {
                commands: Vec::new(),
                keep_running: self.should_keep_running(),
            };
        }

        if self.shutting_down {
            info!(build_id, "in-flight build finished during shutdown");
            return CoreStep {
                commands: Vec::new(),
                keep_running: false,
            };
        }

        let mut commands = Vec::new();
        if outcome.is_success() {
            commands.push(CoreCommand::NotifyReload);
        }
        commands.extend(self.dispatch_if_ready());

        CoreStep {
            commands,
            keep_running: self.should_keep_running(),
        }
    }

    fn handle_shutdown(&mut self) -> CoreStep {
        self.shutting_down = true;

        // Keep the loop alive only to collect the build that is in flight.
        let waiting = self.scheduler.in_flight();
        if let Some(build_id) = waiting {
            info!(build_id, "shutdown requested; waiting for in-flight build");
        } else {
            info!("shutdown requested");
        }

        CoreStep {
            commands: Vec::new(),
            keep_running: waiting.is_some(),
        }
    }

    fn should_keep_running(&self) -> bool {
        if self.shutting_down {
            return self.scheduler.in_flight().is_some();
        }
        !(self.options.exit_when_idle && self.scheduler.is_idle())
    }

    fn dispatch_if_ready(&mut self) -> Vec<CoreCommand> {
        self.scheduler
            .tick()
            .map(CoreCommand::DispatchBuild)
            .into_iter()
            .collect()
    }
}
