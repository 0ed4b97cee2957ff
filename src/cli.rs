// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::SecondViewerPolicy;

/// Command-line arguments for `htmlsplice`.
///
/// Every option that also exists in the TOML config file is an `Option`
/// here so that "not given on the command line" can fall back to the file.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "htmlsplice",
    version,
    about = "Splice the CSS and JavaScript files of a directory into a single HTML document.",
    long_about = "Reads every .css and .js file below INPUT_DIR and inserts their contents \
                  verbatim into the {{.CSS}} and {{.Javascript}} slots of an HTML template. \
                  With --watch the document is rebuilt whenever the inputs change and a \
                  connected browser is told to reload."
)]
pub struct CliArgs {
    /// Directory containing the .css and .js sources.
    #[arg(value_name = "INPUT_DIR")]
    pub input: Option<PathBuf>,

    /// Output file. Parent directories are created. Defaults to stdout.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub outfile: Option<PathBuf>,

    /// HTML template with `{{.CSS}}` and `{{.Javascript}}` slots.
    #[arg(short = 't', long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Regex of file names whose changes are ignored in watch mode.
    #[arg(short = 'i', long, value_name = "REGEX")]
    pub ignore: Option<String>,

    /// Keep rebuilding as the input directory and template change.
    #[arg(short = 'w', long)]
    pub watch: bool,

    /// Port of the hot-reload server in watch mode (0 disables serving).
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Path of the hot-reload WebSocket endpoint.
    #[arg(long, value_name = "PATH")]
    pub reload_path: Option<String>,

    /// What to do when a second browser connects (replace or reject).
    #[arg(long, value_name = "POLICY")]
    pub on_second_viewer: Option<SecondViewerPolicy>,

    /// Open the output file in a browser after the first successful build.
    #[arg(long)]
    pub open: bool,

    /// Optional TOML config file; command-line values take precedence.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `-v`, `HTMLSPLICE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Shorthand for `--log-level debug`.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Resolve and print the settings, but don't build anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
