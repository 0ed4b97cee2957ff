// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::build::sink::SinkTarget;
use crate::types::SecondViewerPolicy;

pub const DEFAULT_PORT: u16 = 8082;
pub const DEFAULT_RELOAD_PATH: &str = "/hotreload";
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 5000;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [build]
/// input = "web"
/// outfile = "dist/index.html"
/// template = "web/index.tmpl.html"
///
/// [watch]
/// ignore = "^\\.#"
/// shutdown_grace_ms = 5000
///
/// [serve]
/// port = 8082
/// reload_path = "/hotreload"
/// on_second_viewer = "replace"
/// open = false
/// ```
///
/// All sections are optional; anything given on the command line wins.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub serve: ServeSection,
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    #[serde(default)]
    pub input: Option<PathBuf>,

    #[serde(default)]
    pub outfile: Option<PathBuf>,

    #[serde(default)]
    pub template: Option<PathBuf>,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Regex over file names; matching change events never trigger a build.
    #[serde(default)]
    pub ignore: Option<String>,

    /// Upper bound on how long shutdown waits for an in-flight build.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

fn default_shutdown_grace_ms() -> u64 {
    DEFAULT_SHUTDOWN_GRACE_MS
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            ignore: None,
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

/// `[serve]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServeSection {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_reload_path")]
    pub reload_path: String,

    #[serde(default)]
    pub on_second_viewer: SecondViewerPolicy,

    #[serde(default)]
    pub open: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_reload_path() -> String {
    DEFAULT_RELOAD_PATH.to_string()
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            reload_path: default_reload_path(),
            on_second_viewer: SecondViewerPolicy::default(),
            open: false,
        }
    }
}

/// A validated config file.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see
/// [`crate::config::validate`]), so holders know the sections are sane.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub build: BuildSection,
    pub watch: WatchSection,
    pub serve: ServeSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            build: raw.build,
            watch: raw.watch,
            serve: raw.serve,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// Viewer server options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeOptions {
    pub port: u16,
    pub reload_path: String,
    pub policy: SecondViewerPolicy,
    pub open_browser: bool,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub sink: SinkTarget,
    pub template: Option<PathBuf>,
    pub ignore: Option<String>,
    pub watch: bool,
    pub serve: ServeOptions,
    pub shutdown_grace: Duration,
}

impl Settings {
    /// Serving (and hot reload) needs live mode, a non-zero port and a file
    /// the server can hand out.
    pub fn serving_enabled(&self) -> bool {
        self.watch && self.serve.port != 0 && matches!(self.sink, SinkTarget::File(_))
    }
}
