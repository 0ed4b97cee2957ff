// src/watch/mod.rs

//! File watching and change classification.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`) per target.
//! - Turning raw notify events into [`ChangeEvent`] batches.
//! - Deciding whether a batch should cause a rebuild ([`ChangeClassifier`]).
//!
//! It does **not** know about scheduling; the runtime owns that.

pub mod classifier;
pub mod event;
pub mod watcher;

pub use classifier::ChangeClassifier;
pub use event::{change_events_from_notify, ChangeEvent};
pub use watcher::{spawn_watcher, WatcherHandle};
