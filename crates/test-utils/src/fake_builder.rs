use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use htmlsplice::build::{BuildBackend, BuildRequest};
use htmlsplice::engine::{BuildOutcome, RuntimeEvent};
use htmlsplice::errors::Result;
use tokio::sync::mpsc;

/// A fake backend that:
/// - records every request it receives
/// - immediately reports `BuildCompleted` with the configured outcome.
pub struct FakeBuilder {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    requests: Arc<Mutex<Vec<BuildRequest>>>,
    outcome: BuildOutcome,
}

impl FakeBuilder {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        requests: Arc<Mutex<Vec<BuildRequest>>>,
    ) -> Self {
        Self {
            runtime_tx,
            requests,
            outcome: BuildOutcome::Success,
        }
    }

    pub fn with_outcome(mut self, outcome: BuildOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

impl BuildBackend for FakeBuilder {
    fn dispatch(
        &mut self,
        request: BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let requests = Arc::clone(&self.requests);
        let outcome = self.outcome.clone();

        Box::pin(async move {
            let build_id = request.build_id;
            requests.lock().unwrap().push(request);

            // Completion goes through a task so the runtime never blocks on
            // its own (bounded) ingress channel.
            tokio::spawn(async move {
                let _ = tx.send(RuntimeEvent::BuildCompleted { build_id, outcome }).await;
            });
            Ok(())
        })
    }
}

/// Handle for completing builds started by a [`ControllableBuilder`].
#[derive(Clone)]
pub struct BuildControl {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    started: Arc<Mutex<VecDeque<BuildRequest>>>,
    all: Arc<Mutex<Vec<BuildRequest>>>,
    started_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<u64>>>,
}

impl BuildControl {
    /// Wait until the next build has been dispatched and return its id.
    pub async fn next_started(&self) -> u64 {
        self.started_rx
            .lock()
            .await
            .recv()
            .await
            .expect("controllable builder dropped")
    }

    /// Finish the oldest outstanding build with `outcome`.
    pub async fn complete_next(&self, outcome: BuildOutcome) -> u64 {
        let request = self
            .started
            .lock()
            .unwrap()
            .pop_front()
            .expect("no outstanding build to complete");
        let build_id = request.build_id;
        self.runtime_tx
            .send(RuntimeEvent::BuildCompleted { build_id, outcome })
            .await
            .expect("runtime gone");
        build_id
    }

    /// Every request seen so far, in dispatch order.
    pub fn requests(&self) -> Vec<BuildRequest> {
        self.all.lock().unwrap().clone()
    }

    pub fn dispatched(&self) -> usize {
        self.all.lock().unwrap().len()
    }
}

/// A backend whose builds only finish when the test says so.
pub struct ControllableBuilder {
    started: Arc<Mutex<VecDeque<BuildRequest>>>,
    all: Arc<Mutex<Vec<BuildRequest>>>,
    started_tx: mpsc::UnboundedSender<u64>,
}

impl ControllableBuilder {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> (Self, BuildControl) {
        let started = Arc::new(Mutex::new(VecDeque::new()));
        let all = Arc::new(Mutex::new(Vec::new()));
        let (started_tx, started_rx) = mpsc::unbounded_channel();

        let control = BuildControl {
            runtime_tx,
            started: Arc::clone(&started),
            all: Arc::clone(&all),
            started_rx: Arc::new(tokio::sync::Mutex::new(started_rx)),
        };
        let builder = Self {
            started,
            all,
            started_tx,
        };
        (builder, control)
    }
}

impl BuildBackend for ControllableBuilder {
    fn dispatch(
        &mut self,
        request: BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let build_id = request.build_id;
        self.all.lock().unwrap().push(request.clone());
        self.started.lock().unwrap().push_back(request);
        let _ = self.started_tx.send(build_id);
        Box::pin(async { Ok(()) })
    }
}
