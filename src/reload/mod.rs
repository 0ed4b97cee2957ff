// src/reload/mod.rs

pub mod browser;
pub mod notifier;
pub mod server;
pub mod snippet;

pub use browser::open_in_browser;
pub use notifier::{Delivery, ReloadNotifier, ViewerMessage, ViewerSession, RELOAD_PAYLOAD};
pub use server::{router, spawn_server, ServerHandle, ServerState};
pub use snippet::reload_snippet;
