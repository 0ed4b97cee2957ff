// src/build/sink.rs

//! Where finished artifacts go.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::debug;

/// The configured artifact destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    File(PathBuf),
    Stdout,
}

/// Writes whole artifacts to the configured target.
///
/// File writes go through a temporary file in the destination directory
/// that is renamed over the target, so a reader (the dev server, a browser)
/// never observes a half-written document. Stdout writes hold the stdout
/// lock for the whole document.
#[derive(Debug)]
pub struct ArtifactSink {
    target: SinkTarget,
    live: bool,
}

impl ArtifactSink {
    /// `live` adds the newline separators used between rebuilds on stdout.
    pub fn new(target: SinkTarget, live: bool) -> Self {
        Self { target, live }
    }

    /// Create the destination's parent directories.
    pub fn prepare(&self) -> Result<()> {
        if let SinkTarget::File(path) = &self.target {
            let dir = parent_dir(path);
            fs::create_dir_all(dir)
                .with_context(|| format!("could not make directory for {:?}", path))?;
        }
        Ok(())
    }

    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        match &self.target {
            SinkTarget::File(path) => write_file_atomically(path, bytes),
            SinkTarget::Stdout => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                out.write_all(bytes)?;
                if self.live {
                    out.write_all(b"\n")?;
                }
                out.flush()?;
                Ok(())
            }
        }
    }

    /// Final flush at the end of a live session.
    pub fn finish(&self) -> Result<()> {
        if self.target == SinkTarget::Stdout {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(b"\n")?;
            out.flush()?;
        }
        Ok(())
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn write_file_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = parent_dir(path);
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {:?}", dir))?;
    tmp.write_all(bytes)
        .with_context(|| format!("writing temporary file for {:?}", path))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("syncing temporary file for {:?}", path))?;

    // Temp files are created 0600; the artifact is meant to be readable.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o644))
            .with_context(|| format!("setting permissions for {:?}", path))?;
    }

    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replacing {:?}", path))?;

    debug!(path = %path.display(), bytes = bytes.len(), "artifact written");
    Ok(())
}
