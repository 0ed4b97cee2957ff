// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, error, info, warn};

use crate::build::{ArtifactSink, BuildBackend, BuildRequest, TemplateSource};
use crate::config::DEFAULT_SHUTDOWN_GRACE_MS;
use crate::errors::Result;
use crate::reload::ReloadNotifier;

use super::core::CoreRuntime;
use super::scheduler::ScheduledBuild;
use super::{CoreCommand, RuntimeEvent};

/// What a finished live session did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub builds_dispatched: u64,
    /// True when the shutdown grace period ran out with a build in flight.
    pub drain_timed_out: bool,
}

/// Drives the rebuild scheduler in response to `RuntimeEvent`s and
/// delegates the builds themselves to a `BuildBackend`.
///
/// This is the IO shell around `CoreRuntime`. It owns the template text,
/// the viewer notifier and the output sink, and it bounds the shutdown
/// drain with a grace period.
pub struct Runtime<B: BuildBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
    notifier: Arc<ReloadNotifier>,
    template: TemplateSource,
    sink: Option<Arc<ArtifactSink>>,
    shutdown_grace: Duration,
    deadline: Option<Instant>,
    first_success: Option<Box<dyn FnOnce() + Send>>,
}

impl<B: BuildBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("shutdown_grace", &self.shutdown_grace)
            .finish_non_exhaustive()
    }
}

impl<B: BuildBackend> Runtime<B> {
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        backend: B,
        notifier: Arc<ReloadNotifier>,
        template: TemplateSource,
    ) -> Self {
        Self {
            core,
            event_rx,
            backend,
            notifier,
            template,
            sink: None,
            shutdown_grace: Duration::from_millis(DEFAULT_SHUTDOWN_GRACE_MS),
            deadline: None,
            first_success: None,
        }
    }

    /// Sink to finalize once the loop exits.
    pub fn with_sink(mut self, sink: Arc<ArtifactSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Run `hook` once, after the first build that succeeds.
    pub fn on_first_success(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.first_success = Some(Box::new(hook));
        self
    }

    /// Main event loop.
    ///
    /// Runs until the core says stop, the ingress channel closes, or the
    /// shutdown grace period expires. The viewer is closed on the way out,
    /// also when a dispatch fails.
    pub async fn run(mut self) -> Result<RunSummary> {
        info!("live runtime started");
        let mut drain_timed_out = false;
        let mut failure = None;

        'events: loop {
            let next = match self.deadline {
                Some(deadline) => match timeout_at(deadline, self.event_rx.recv()).await {
                    Ok(event) => event,
                    Err(_) => {
                        warn!(
                            grace_ms = self.shutdown_grace.as_millis() as u64,
                            "build still running after shutdown grace period; exiting anyway"
                        );
                        drain_timed_out = true;
                        break;
                    }
                },
                None => self.event_rx.recv().await,
            };

            let Some(event) = next else {
                info!("runtime event channel closed; exiting");
                break;
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                if let Err(err) = self.execute_command(command).await {
                    error!(error = %err, "failed to hand build to backend; stopping runtime");
                    failure = Some(err);
                    break 'events;
                }
            }

            if self.core.is_shutting_down() && self.deadline.is_none() {
                self.deadline = Some(Instant::now() + self.shutdown_grace);
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        self.notifier.close();
        if let Some(sink) = &self.sink {
            sink.finish()?;
        }
        if let Some(err) = failure {
            return Err(err);
        }

        let summary = RunSummary {
            builds_dispatched: self.core.scheduler().dispatched(),
            drain_timed_out,
        };
        info!(builds = summary.builds_dispatched, "runtime exiting");
        Ok(summary)
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::DispatchBuild(build) => self.dispatch(build).await?,
            CoreCommand::NotifyReload => {
                if let Some(hook) = self.first_success.take() {
                    hook();
                }
                let delivery = self.notifier.notify_reload();
                debug!(?delivery, "reload signal");
            }
        }
        Ok(())
    }

    async fn dispatch(&mut self, build: ScheduledBuild) -> Result<()> {
        if build.reload_template {
            self.template.reload();
        }

        debug!(build_id = build.build_id, "dispatching build");
        let request = BuildRequest {
            build_id: build.build_id,
            template: self.template.text().to_string(),
        };
        self.backend.dispatch(request).await
    }
}
