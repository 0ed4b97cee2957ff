// src/fs/mock.rs

use super::{DirEntry, EntryKind, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum MockEntry {
    File(Vec<u8>),
    Dir,
}

/// In-memory filesystem for tests.
///
/// Directories are implied by the files added below them; a path with no
/// parent component lives under `"."`.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(PathBuf::from("."), MockEntry::Dir);
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.entries.lock().unwrap();

        let mut parent = path.parent();
        while let Some(dir) = parent {
            // "." is seeded by `new`, and `Path::new(".").parent()` is "".
            if dir.as_os_str().is_empty() || dir == Path::new(".") {
                break;
            }
            entries.entry(dir.to_path_buf()).or_insert(MockEntry::Dir);
            parent = dir.parent();
        }

        entries.insert(path, MockEntry::File(content.into()));
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.entries.lock().unwrap().remove(path.as_ref());
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let mut reader = self.open_read(path)?;
        let mut out = String::new();
        reader
            .read_to_string(&mut out)
            .map_err(|e| anyhow!("Invalid UTF-8 in {:?}: {}", path, e))?;
        Ok(out)
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::File(content)) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.entries.lock().unwrap().contains_key(path)
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        let entries = self.entries.lock().unwrap();
        if !matches!(entries.get(dir), Some(MockEntry::Dir)) {
            return Err(anyhow!("Not a directory or not found: {:?}", dir));
        }

        let children = entries
            .iter()
            .filter(|(p, _)| p.as_path() != dir && parent_of(p) == Some(dir))
            .map(|(p, entry)| DirEntry {
                path: p.clone(),
                kind: match entry {
                    MockEntry::Dir => EntryKind::Dir,
                    MockEntry::File(_) => EntryKind::File,
                },
            })
            .collect();
        Ok(children)
    }
}

/// Parent as stored in the map: a bare name lives under ".".
fn parent_of(path: &Path) -> Option<&Path> {
    match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Some(Path::new(".")),
        other => other,
    }
}
