// src/watch/classifier.rs

//! Relevance filter for change batches.

use std::path::PathBuf;

use regex::Regex;
use tracing::{error, trace};

use crate::types::{ContentKind, WatchTarget};
use crate::watch::event::ChangeEvent;

/// Decides whether a batch of change events should trigger a rebuild.
///
/// Rules, per event:
/// - directories and removals never count;
/// - source events count when the extension is `css` or `js` and the file
///   name does not match the ignore pattern;
/// - template events count when they name the template file itself (the
///   template is watched through its directory, so siblings show up too).
#[derive(Debug, Clone, Default)]
pub struct ChangeClassifier {
    ignore: Option<Regex>,
    template_path: Option<PathBuf>,
}

impl ChangeClassifier {
    /// Build a classifier. A pattern that fails to compile is logged and
    /// filtering is disabled instead of failing startup.
    pub fn new(ignore_pattern: Option<&str>, template_path: Option<PathBuf>) -> Self {
        let ignore = ignore_pattern.and_then(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(err) => {
                error!(pattern, error = %err, "failed to compile ignore pattern; ignore filtering disabled");
                None
            }
        });

        Self {
            ignore,
            template_path,
        }
    }

    /// Whether an ignore pattern is active.
    pub fn has_ignore(&self) -> bool {
        self.ignore.is_some()
    }

    pub fn is_relevant(&self, target: WatchTarget, events: &[ChangeEvent]) -> bool {
        events.iter().any(|e| self.is_relevant_event(target, e))
    }

    pub fn is_relevant_event(&self, target: WatchTarget, event: &ChangeEvent) -> bool {
        if event.is_directory || event.was_removed {
            return false;
        }

        let relevant = match target {
            WatchTarget::Source => self.is_relevant_source(event),
            WatchTarget::Template => self
                .template_path
                .as_deref()
                .is_some_and(|t| event.path == t),
        };

        trace!(?target, path = %event.path.display(), relevant, "classified change");
        relevant
    }

    fn is_relevant_source(&self, event: &ChangeEvent) -> bool {
        if let (Some(re), Some(name)) = (&self.ignore, event.file_name()) {
            if re.is_match(name) {
                return false;
            }
        }

        event
            .extension
            .as_deref()
            .and_then(ContentKind::from_extension)
            .is_some()
    }
}
