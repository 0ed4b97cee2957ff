// src/fs/mod.rs

//! Read access to the input tree and the template.
//!
//! Builds and template reloads go through [`FileSystem`] so they can run
//! against [`mock::MockFileSystem`] in tests. Artifact writes do not; they
//! belong to [`crate::build::sink`].

use std::fmt::Debug;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

/// What a listed path is, without following a final symlink into a
/// directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Anything that is not a directory, including links to files and
    /// dangling links.
    File,
    Dir,
    /// A symlink whose target is a directory. Never descended into, so a
    /// link pointing back up the tree cannot loop.
    DirLink,
}

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>>;
    fn exists(&self, path: &Path) -> bool;

    /// Children of `dir`, in no particular order.
    fn list_dir(&self, dir: &Path) -> Result<Vec<DirEntry>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let file =
            fs::File::open(path).with_context(|| format!("could not open {}", path.display()))?;
        Ok(Box::new(file))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        let listing =
            fs::read_dir(dir).with_context(|| format!("could not list {}", dir.display()))?;

        let mut entries = Vec::new();
        for entry in listing {
            let path = entry
                .with_context(|| format!("could not list {}", dir.display()))?
                .path();
            let kind = entry_kind(&path);
            entries.push(DirEntry { path, kind });
        }
        Ok(entries)
    }
}

fn entry_kind(path: &Path) -> EntryKind {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return EntryKind::File;
    };
    if meta.is_dir() {
        EntryKind::Dir
    } else if meta.file_type().is_symlink() && fs::metadata(path).is_ok_and(|m| m.is_dir()) {
        EntryKind::DirLink
    } else {
        EntryKind::File
    }
}
