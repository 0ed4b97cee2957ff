// src/build/walk.rs

//! One-pass walk of the input directory.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, trace, warn};

use crate::fs::{DirEntry, EntryKind, FileSystem};
use crate::types::ContentKind;

/// Concatenated contents of every CSS and JavaScript file under a root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBundle {
    pub css: String,
    pub javascript: String,
    pub files: usize,
}

impl SourceBundle {
    fn append(&mut self, kind: ContentKind, content: &str) {
        match kind {
            ContentKind::Css => self.css.push_str(content),
            ContentKind::Javascript => self.javascript.push_str(content),
        }
        self.files += 1;
    }
}

/// Walk `root` depth-first in lexical order and gather the matching files.
///
/// Symlinked files are read; symlinked directories are skipped.
/// Files are appended verbatim. A file that disappears between listing and
/// reading is skipped; any other read failure aborts the walk.
pub fn collect_sources(fs: &dyn FileSystem, root: &Path) -> Result<SourceBundle> {
    let mut bundle = SourceBundle::default();
    walk_dir(fs, root, &mut bundle)?;
    debug!(
        root = %root.display(),
        files = bundle.files,
        css_bytes = bundle.css.len(),
        js_bytes = bundle.javascript.len(),
        "collected sources"
    );
    Ok(bundle)
}

fn walk_dir(fs: &dyn FileSystem, dir: &Path, bundle: &mut SourceBundle) -> Result<()> {
    let mut entries = fs.list_dir(dir)?;
    entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

    for DirEntry { path, kind } in entries {
        match kind {
            EntryKind::Dir => {
                walk_dir(fs, &path, bundle)?;
                continue;
            }
            EntryKind::DirLink => {
                debug!(path = %path.display(), "not following directory symlink");
                continue;
            }
            EntryKind::File => {}
        }

        let Some(kind) = ContentKind::from_path(&path) else {
            continue;
        };

        let mut reader = match fs.open_read(&path) {
            Ok(r) => r,
            Err(_) if !fs.exists(&path) => {
                debug!(path = %path.display(), "file vanished during walk; skipping");
                continue;
            }
            Err(err) => return Err(err),
        };

        let mut raw = Vec::new();
        reader
            .read_to_end(&mut raw)
            .with_context(|| format!("reading {:?}", path))?;

        let content = match String::from_utf8(raw) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %path.display(), "file is not valid UTF-8; replacing invalid bytes");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        trace!(path = %path.display(), ?kind, bytes = content.len(), "appending source");
        bundle.append(kind, &content);
    }

    Ok(())
}
