// src/build/executor.rs

//! Running a full rebuild and reporting back to the runtime.
//!
//! The runtime talks to a [`BuildBackend`] instead of running builds
//! itself, so tests can swap in a backend that records requests and decides
//! when (and how) each build completes.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::build::sink::ArtifactSink;
use crate::build::template::{SlotValues, Template};
use crate::build::walk::{collect_sources, SourceBundle};
use crate::engine::{BuildOutcome, RuntimeEvent};
use crate::errors::Result;
use crate::fs::FileSystem;

/// A build the runtime wants executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub build_id: u64,
    /// Template text as of dispatch.
    pub template: String,
}

/// Everything a build needs besides the template.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub input_dir: PathBuf,
    pub fs: Arc<dyn FileSystem>,
    pub sink: Arc<ArtifactSink>,
    /// Script appended to the JavaScript slot when a viewer server runs.
    pub reload_snippet: Option<String>,
}

/// Render the document without writing it anywhere.
pub fn render_document(
    fs: &dyn FileSystem,
    input_dir: &std::path::Path,
    template_text: &str,
    reload_snippet: Option<&str>,
) -> Result<String> {
    let template = Template::parse(template_text)?;
    let bundle = collect_sources(fs, input_dir)?;
    Ok(template.render(&slot_values(&bundle, reload_snippet)))
}

/// Wrap the gathered sources in their `<style>` / `<script>` elements.
pub fn slot_values(bundle: &SourceBundle, reload_snippet: Option<&str>) -> SlotValues {
    let mut css = String::with_capacity(bundle.css.len() + 32);
    css.push_str(r#"<style type="text/css">"#);
    css.push_str(&bundle.css);
    css.push_str("</style>");

    let mut javascript = String::with_capacity(bundle.javascript.len() + 40);
    javascript.push_str(r#"<script type="text/javascript">"#);
    javascript.push_str(&bundle.javascript);
    if let Some(snippet) = reload_snippet {
        javascript.push_str(snippet);
    }
    javascript.push_str("</script>");

    SlotValues { css, javascript }
}

/// Render and hand the bytes to the sink.
///
/// On error nothing is written, so the previous artifact stays in place.
pub fn execute_build(ctx: &BuildContext, template_text: &str) -> Result<usize> {
    let document = render_document(
        ctx.fs.as_ref(),
        &ctx.input_dir,
        template_text,
        ctx.reload_snippet.as_deref(),
    )?;
    ctx.sink.write(document.as_bytes())?;
    Ok(document.len())
}

/// Trait abstracting how builds are executed.
pub trait BuildBackend: Send {
    /// Start the given build.
    ///
    /// Implementations must eventually emit exactly one
    /// `RuntimeEvent::BuildCompleted` carrying `request.build_id`, whether
    /// the build succeeds or not.
    fn dispatch(
        &mut self,
        request: BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production backend: runs each build on the blocking pool.
pub struct LocalBuildBackend {
    ctx: BuildContext,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl LocalBuildBackend {
    pub fn new(ctx: BuildContext, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { ctx, runtime_tx }
    }
}

impl BuildBackend for LocalBuildBackend {
    fn dispatch(
        &mut self,
        request: BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let ctx = self.ctx.clone();
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            let build_id = request.build_id;
            debug!(build_id, "starting build");

            tokio::spawn(async move {
                let joined = tokio::task::spawn_blocking(move || {
                    execute_build(&ctx, &request.template)
                })
                .await;

                let outcome = match joined {
                    Ok(Ok(bytes)) => {
                        info!(build_id, bytes, "build finished");
                        BuildOutcome::Success
                    }
                    Ok(Err(err)) => {
                        error!(build_id, error = %err, "failed to pre-process input");
                        BuildOutcome::Failed(err.to_string())
                    }
                    Err(join_err) => {
                        error!(build_id, error = %join_err, "build task panicked");
                        BuildOutcome::Failed(join_err.to_string())
                    }
                };

                if tx
                    .send(RuntimeEvent::BuildCompleted { build_id, outcome })
                    .await
                    .is_err()
                {
                    debug!(build_id, "runtime gone before build completion was delivered");
                }
            });

            Ok(())
        })
    }
}
