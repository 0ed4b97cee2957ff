// src/reload/notifier.rs

//! Zero-or-one live viewer and the reload signal sent to it.
//!
//! The notifier never touches sockets. A connection is represented by the
//! sending half of a channel; whoever accepted the socket (see
//! [`crate::reload::server`]) owns the receiving half and turns
//! [`ViewerMessage`]s into frames. When that side goes away the channel
//! closes, and the next delivery attempt discards the connection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::types::SecondViewerPolicy;

/// Text payload that tells the page to reload.
pub const RELOAD_PAYLOAD: &str = "reload";

/// Messages delivered to the connection owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerMessage {
    Reload,
    Close,
}

/// Result of one `notify_reload` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    NoViewer,
    /// The viewer was gone; its connection has been discarded.
    Dropped,
}

/// The accepting side's view of an installed connection.
#[derive(Debug)]
pub struct ViewerSession {
    pub id: u64,
    pub messages: mpsc::UnboundedReceiver<ViewerMessage>,
}

#[derive(Debug)]
struct ViewerConnection {
    id: u64,
    tx: mpsc::UnboundedSender<ViewerMessage>,
}

impl ViewerConnection {
    fn close(self) {
        // Failure means the owner already went away.
        let _ = self.tx.send(ViewerMessage::Close);
    }
}

#[derive(Debug)]
pub struct ReloadNotifier {
    policy: SecondViewerPolicy,
    current: Mutex<Option<ViewerConnection>>,
    next_id: AtomicU64,
}

impl ReloadNotifier {
    pub fn new(policy: SecondViewerPolicy) -> Self {
        Self {
            policy,
            current: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn has_viewer(&self) -> bool {
        self.lock().is_some()
    }

    /// Install a freshly handshaken viewer.
    ///
    /// Under `Replace` the previous connection is closed while the slot is
    /// held, so there is never a moment with two installed viewers. Under
    /// `Reject` a live previous connection wins and `None` is returned.
    pub fn connect(&self) -> Option<ViewerSession> {
        let mut slot = self.lock();

        if let Some(existing) = slot.as_ref() {
            let alive = !existing.tx.is_closed();
            if alive && self.policy == SecondViewerPolicy::Reject {
                info!(current = existing.id, "viewer already connected; rejecting new viewer");
                return None;
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, messages) = mpsc::unbounded_channel();

        if let Some(previous) = slot.replace(ViewerConnection { id, tx }) {
            info!(previous = previous.id, id, "replacing viewer connection");
            previous.close();
        } else {
            info!(id, "viewer connected");
        }

        Some(ViewerSession { id, messages })
    }

    /// Forget connection `id` if it is still the installed one.
    pub fn disconnect(&self, id: u64) {
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|c| c.id == id) {
            slot.take();
            info!(id, "viewer disconnected");
        } else {
            debug!(id, "stale viewer disconnect ignored");
        }
    }

    /// Push one reload signal to the current viewer, if any.
    pub fn notify_reload(&self) -> Delivery {
        let mut slot = self.lock();
        let Some(conn) = slot.as_ref() else {
            debug!("no viewer connected; skipping reload signal");
            return Delivery::NoViewer;
        };

        match conn.tx.send(ViewerMessage::Reload) {
            Ok(()) => {
                debug!(id = conn.id, "reload signal sent");
                Delivery::Delivered
            }
            Err(_) => {
                warn!(id = conn.id, "failed to write reload message; viewer is gone");
                slot.take();
                Delivery::Dropped
            }
        }
    }

    /// Close and forget the current viewer (shutdown).
    pub fn close(&self) {
        if let Some(conn) = self.lock().take() {
            info!(id = conn.id, "closing viewer connection");
            conn.close();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ViewerConnection>> {
        // Nothing in this module panics while holding the lock; recover
        // the slot rather than poisoning every later caller.
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
