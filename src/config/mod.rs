// src/config/mod.rs

//! Configuration: optional TOML file plus command-line overrides.
//!
//! - [`model`] holds the serde structs for the file and the resolved
//!   [`Settings`] the rest of the program consumes.
//! - [`loader`] reads and deserializes the file.
//! - [`validate`] checks the file and merges it with the CLI.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    BuildSection, ConfigFile, RawConfigFile, ServeOptions, ServeSection, Settings, WatchSection,
    DEFAULT_PORT, DEFAULT_RELOAD_PATH, DEFAULT_SHUTDOWN_GRACE_MS,
};
pub use validate::resolve_settings;
