#![allow(dead_code)]

use std::path::Path;

use htmlsplice::cli::CliArgs;
use htmlsplice::config::{ConfigFile, RawConfigFile};
use htmlsplice::types::SecondViewerPolicy;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn input(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.build.input = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn outfile(mut self, path: impl AsRef<Path>) -> Self {
        self.config.build.outfile = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn template(mut self, path: impl AsRef<Path>) -> Self {
        self.config.build.template = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn ignore(mut self, pattern: &str) -> Self {
        self.config.watch.ignore = Some(pattern.to_string());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.serve.port = port;
        self
    }

    pub fn reload_path(mut self, path: &str) -> Self {
        self.config.serve.reload_path = path.to_string();
        self
    }

    pub fn on_second_viewer(mut self, policy: SecondViewerPolicy) -> Self {
        self.config.serve.on_second_viewer = policy;
        self
    }

    pub fn shutdown_grace_ms(mut self, ms: u64) -> Self {
        self.config.watch.shutdown_grace_ms = ms;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse command-line arguments the way the binary would.
pub fn cli_args<I, S>(args: I) -> CliArgs
where
    I: IntoIterator<Item = S>,
    S: Into<std::ffi::OsString> + Clone,
{
    use clap::Parser;

    let mut full: Vec<std::ffi::OsString> = vec!["htmlsplice".into()];
    full.extend(args.into_iter().map(Into::into));
    CliArgs::try_parse_from(full).expect("invalid test command line")
}
