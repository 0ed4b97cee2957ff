// src/watch/event.rs

use std::path::{Path, PathBuf};

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};

/// One filesystem change as seen by the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub is_directory: bool,
    pub was_removed: bool,
    /// Lower-cased extension without the dot.
    pub extension: Option<String>,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, is_directory: bool, was_removed: bool) -> Self {
        let path = path.into();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        Self {
            path,
            is_directory,
            was_removed,
            extension,
        }
    }

    /// A plain file that was created or written.
    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(path, false, false)
    }

    pub fn removed(path: impl Into<PathBuf>) -> Self {
        Self::new(path, false, true)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Convert one notify event into change events, one per path.
///
/// Access events (opens, reads, closes) say nothing about content and map to
/// an empty list; otherwise the build's own reads would re-trigger it. For a
/// rename carrying both paths, the first is the removed side.
pub fn change_events_from_notify(event: &Event) -> Vec<ChangeEvent> {
    let (removed, folder) = match event.kind {
        EventKind::Access(_) => return Vec::new(),
        EventKind::Remove(kind) => (true, kind == RemoveKind::Folder),
        EventKind::Create(kind) => (false, kind == CreateKind::Folder),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => (true, false),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            return event
                .paths
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let was_removed = i == 0;
                    ChangeEvent::new(p.clone(), !was_removed && is_dir(p), was_removed)
                })
                .collect();
        }
        _ => (false, false),
    };

    event
        .paths
        .iter()
        .map(|p| ChangeEvent::new(p.clone(), folder || (!removed && is_dir(p)), removed))
        .collect()
}

fn is_dir(path: &Path) -> bool {
    path.is_dir()
}
