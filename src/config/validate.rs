// src/config/validate.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::build::sink::SinkTarget;
use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile, ServeOptions, Settings};
use crate::errors::{Result, SpliceError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::SpliceError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_reload_path(&cfg.serve.reload_path)?;
    validate_grace(cfg.watch.shutdown_grace_ms)?;
    Ok(())
}

fn validate_reload_path(path: &str) -> Result<()> {
    if !path.starts_with('/') || path.len() < 2 {
        return Err(SpliceError::ConfigError(format!(
            "reload path must start with '/' and name an endpoint (got {path:?})"
        )));
    }
    Ok(())
}

fn validate_grace(ms: u64) -> Result<()> {
    // The `ignore` regex is deliberately not checked here: a bad pattern only
    // disables filtering once the watch loop starts.
    if ms == 0 {
        return Err(SpliceError::ConfigError(
            "[watch].shutdown_grace_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Merge the command line over the (validated) config file and check the
/// result against the filesystem.
pub fn resolve_settings(cli: &CliArgs, file: ConfigFile) -> Result<Settings> {
    let ConfigFile { build, watch, serve } = file;

    let input_dir = cli.input.clone().or(build.input).ok_or_else(|| {
        SpliceError::ConfigError("no input directory specified; see --help".to_string())
    })?;
    validate_input_dir(&input_dir)?;

    let sink = match cli.outfile.clone().or(build.outfile) {
        Some(path) => {
            validate_outfile(&path)?;
            SinkTarget::File(path)
        }
        None => SinkTarget::Stdout,
    };

    let reload_path = cli.reload_path.clone().unwrap_or(serve.reload_path);
    validate_reload_path(&reload_path)?;

    Ok(Settings {
        input_dir,
        sink,
        template: cli.template.clone().or(build.template),
        ignore: cli.ignore.clone().or(watch.ignore),
        watch: cli.watch,
        serve: ServeOptions {
            port: cli.port.unwrap_or(serve.port),
            reload_path,
            policy: cli.on_second_viewer.unwrap_or(serve.on_second_viewer),
            open_browser: cli.open || serve.open,
        },
        shutdown_grace: Duration::from_millis(watch.shutdown_grace_ms),
    })
}

fn validate_input_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Err(SpliceError::ConfigError(format!(
            "{} does not exist",
            dir.display()
        )));
    }
    if !dir.is_dir() {
        return Err(SpliceError::ConfigError(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    Ok(())
}

fn validate_outfile(path: &PathBuf) -> Result<()> {
    let raw = path.to_string_lossy();
    let names_dir = raw.ends_with('/') || raw.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir();
    if names_dir {
        return Err(SpliceError::ConfigError(format!(
            "{} is a directory path, not a file",
            path.display()
        )));
    }
    Ok(())
}
