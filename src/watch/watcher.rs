// src/watch/watcher.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::RuntimeEvent;
use crate::types::WatchTarget;
use crate::watch::event::change_events_from_notify;

/// Keeps one watched target alive.
///
/// Dropping the handle drops the notify watcher; the forwarding task then
/// sees its channel close and stops producing batches.
pub struct WatcherHandle {
    target: WatchTarget,
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Spawn a filesystem watcher on `path` and forward each notify event as one
/// `RuntimeEvent::Changes` batch tagged with `target`.
///
/// Failing to start watching is returned as an error; callers treat it as
/// fatal at startup.
pub fn spawn_watcher(
    target: WatchTarget,
    path: impl Into<PathBuf>,
    recursive: bool,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let path = path.into();
    // Canonicalize once so event paths are comparable with configured ones.
    let path = path.canonicalize().unwrap_or_else(|_| path.clone());

    // notify calls back on its own thread.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                // Fails only once the forwarding task is gone (shutdown).
                let _ = event_tx.send(event);
            }
            Err(err) => {
                error!(?target, error = %err, "file watch error");
            }
        },
        Config::default(),
    )
    .with_context(|| format!("creating watcher for {:?}", path))?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher
        .watch(&path, mode)
        .with_context(|| format!("could not watch {:?}", path))?;

    info!(?target, path = %path.display(), recursive, "file watcher started");

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?target, ?event, "received notify event");

            let events = change_events_from_notify(&event);
            if events.is_empty() {
                continue;
            }

            if let Err(err) = runtime_tx
                .send(RuntimeEvent::Changes { target, events })
                .await
            {
                // Runtime gone: nothing left to feed.
                warn!(?target, "failed to send RuntimeEvent::Changes: {err}");
                return;
            }
        }
        debug!(?target, "watcher event loop finished");
    });

    Ok(WatcherHandle {
        target,
        _inner: watcher,
    })
}
