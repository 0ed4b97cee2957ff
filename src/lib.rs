// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod reload;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::build::{
    execute_build, ArtifactSink, BuildContext, LocalBuildBackend, SinkTarget, TemplateSource,
};
use crate::cli::CliArgs;
use crate::config::{load_and_validate, resolve_settings, ConfigFile, Settings};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::reload::{open_in_browser, reload_snippet, spawn_server, ReloadNotifier};
use crate::types::WatchTarget;
use crate::watch::{spawn_watcher, ChangeClassifier};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI merging
/// - the one-shot build, or
/// - live mode: watchers, viewer server, runtime and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let file = match &args.config {
        Some(path) => load_and_validate(path)?,
        None => ConfigFile::default(),
    };
    let settings = resolve_settings(&args, file)?;

    if args.dry_run {
        print_dry_run(&settings);
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let template = TemplateSource::load(fs.clone(), settings.template.clone())?;

    let sink = Arc::new(ArtifactSink::new(settings.sink.clone(), settings.watch));
    sink.prepare()?;

    if !settings.watch {
        let ctx = BuildContext {
            input_dir: settings.input_dir.clone(),
            fs,
            sink,
            reload_snippet: None,
        };
        let bytes = execute_build(&ctx, template.text())?;
        debug!(bytes, "one-shot build finished");
        return Ok(());
    }

    run_live(settings, fs, template, sink).await
}

async fn run_live(
    settings: Settings,
    fs: Arc<dyn FileSystem>,
    template: TemplateSource,
    sink: Arc<ArtifactSink>,
) -> Result<()> {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let source_watcher = spawn_watcher(
        WatchTarget::Source,
        settings.input_dir.clone(),
        true,
        rt_tx.clone(),
    )?;

    // The template is watched through its directory so editors that replace
    // the file on save keep producing events.
    let canonical_template = settings
        .template
        .as_ref()
        .map(|p| p.canonicalize().unwrap_or_else(|_| p.clone()));
    let template_watcher = match &canonical_template {
        Some(path) => {
            let dir = template_dir(path);
            Some(spawn_watcher(WatchTarget::Template, dir, false, rt_tx.clone())?)
        }
        None => None,
    };

    let classifier = ChangeClassifier::new(settings.ignore.as_deref(), canonical_template);
    let notifier = Arc::new(ReloadNotifier::new(settings.serve.policy));

    let server = match &settings.sink {
        SinkTarget::File(artifact) if settings.serving_enabled() => {
            let handle = spawn_server(
                settings.serve.port,
                &settings.serve.reload_path,
                artifact.clone(),
                notifier.clone(),
            )
            .await?;
            Some(handle)
        }
        SinkTarget::Stdout => {
            info!("no outfile given; live viewer is disabled");
            None
        }
        SinkTarget::File(_) => None,
    };

    let reload_snippet = server
        .as_ref()
        .map(|h| reload_snippet(h.local_addr().port(), &settings.serve.reload_path));

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    rt_tx
        .send(RuntimeEvent::RebuildRequested {
            reason: TriggerReason::Startup,
        })
        .await
        .map_err(|_| anyhow!("runtime channel closed before startup build"))?;

    let ctx = BuildContext {
        input_dir: settings.input_dir.clone(),
        fs,
        sink: sink.clone(),
        reload_snippet,
    };
    let backend = LocalBuildBackend::new(ctx, rt_tx);

    let core = CoreRuntime::new(classifier, RuntimeOptions::default());
    let mut runtime = Runtime::new(core, rt_rx, backend, notifier, template)
        .with_sink(sink)
        .with_shutdown_grace(settings.shutdown_grace);
    // Open the page only once there is something to show.
    if let (Some(_), SinkTarget::File(artifact)) = (&server, &settings.sink) {
        if settings.serve.open_browser {
            let artifact = artifact.clone();
            runtime = runtime.on_first_success(move || open_in_browser(artifact));
        }
    }
    let summary = runtime.run().await?;

    drop(source_watcher);
    drop(template_watcher);
    if let Some(server) = server {
        server.shutdown().await;
    }

    if summary.drain_timed_out {
        warn!("exited with a build still running");
    }
    info!(builds = summary.builds_dispatched, "live mode exited cleanly");
    Ok(())
}

fn template_dir(template: &std::path::Path) -> PathBuf {
    match template.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Simple dry-run output: print the resolved settings.
fn print_dry_run(settings: &Settings) {
    println!("htmlsplice dry-run");
    println!("  input_dir = {}", settings.input_dir.display());
    match &settings.sink {
        SinkTarget::File(path) => println!("  outfile = {}", path.display()),
        SinkTarget::Stdout => println!("  outfile = <stdout>"),
    }
    match &settings.template {
        Some(path) => println!("  template = {}", path.display()),
        None => println!("  template = <default>"),
    }
    if let Some(ignore) = &settings.ignore {
        println!("  ignore = {ignore}");
    }
    println!("  watch = {}", settings.watch);
    if settings.serving_enabled() {
        println!(
            "  serve = 127.0.0.1:{} (reload at {}, second viewer: {:?})",
            settings.serve.port, settings.serve.reload_path, settings.serve.policy
        );
    } else {
        println!("  serve = disabled");
    }
}
