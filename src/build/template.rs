// src/build/template.rs

//! The HTML template: parsing, rendering and the reloadable source.
//!
//! A template is plain text with two kinds of action, `{{.CSS}}` and
//! `{{.Javascript}}`. Whitespace inside the braces is allowed. Anything else
//! between `{{` and `}}` is a parse error, as is a `{{` that never closes.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::errors::{Result, SpliceError};
use crate::fs::FileSystem;

/// Template used when no `--template` is given.
pub const DEFAULT_TEMPLATE: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    {{.CSS}}
  </head>
  <body></body>
  {{.Javascript}}
</html>"#;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed action starting at byte {offset}")]
    Unclosed { offset: usize },

    #[error("empty action at byte {offset}")]
    Empty { offset: usize },

    #[error("unknown slot {name:?} at byte {offset} (expected .CSS or .Javascript)")]
    UnknownSlot { name: String, offset: usize },
}

/// A named insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Css,
    Javascript,
}

impl Slot {
    fn from_action(action: &str) -> Option<Self> {
        match action {
            ".CSS" => Some(Slot::Css),
            ".Javascript" => Some(Slot::Javascript),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot(Slot),
}

/// Values substituted into the slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotValues {
    pub css: String,
    pub javascript: String,
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(text: &str) -> std::result::Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut pos = 0;

        while let Some(rel) = text[pos..].find(OPEN) {
            let start = pos + rel;
            if start > pos {
                segments.push(Segment::Text(text[pos..start].to_string()));
            }

            let inner_start = start + OPEN.len();
            let inner_len = text[inner_start..]
                .find(CLOSE)
                .ok_or(TemplateError::Unclosed { offset: start })?;
            let action = text[inner_start..inner_start + inner_len].trim();

            if action.is_empty() {
                return Err(TemplateError::Empty { offset: start });
            }
            let slot = Slot::from_action(action).ok_or_else(|| TemplateError::UnknownSlot {
                name: action.to_string(),
                offset: start,
            })?;
            segments.push(Segment::Slot(slot));

            pos = inner_start + inner_len + CLOSE.len();
        }

        if pos < text.len() {
            segments.push(Segment::Text(text[pos..].to_string()));
        }

        Ok(Self { segments })
    }

    /// Slots in the order they appear.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Slot(slot) => Some(*slot),
            Segment::Text(_) => None,
        })
    }

    pub fn render(&self, values: &SlotValues) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(Slot::Css) => out.push_str(&values.css),
                Segment::Slot(Slot::Javascript) => out.push_str(&values.javascript),
            }
        }
        out
    }
}

/// The current template text, owned by the orchestrator.
///
/// `reload` re-reads the file; if that fails the previous text stays in
/// place. Parsing is left to the build so that a broken template shows up as
/// a failed build rather than silently rendering with stale markup.
#[derive(Debug)]
pub struct TemplateSource {
    fs: Arc<dyn FileSystem>,
    path: Option<PathBuf>,
    text: String,
}

impl TemplateSource {
    /// Load the template at startup. An unreadable template file is fatal.
    pub fn load(fs: Arc<dyn FileSystem>, path: Option<PathBuf>) -> Result<Self> {
        let text = match &path {
            Some(p) => read_template(fs.as_ref(), p)?,
            None => DEFAULT_TEMPLATE.to_string(),
        };
        Ok(Self { fs, path, text })
    }

    /// A source that never reloads (used by tests and one-off builds).
    pub fn fixed(fs: Arc<dyn FileSystem>, text: impl Into<String>) -> Self {
        Self {
            fs,
            path: None,
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true if the text was refreshed from disk.
    pub fn reload(&mut self) -> bool {
        let Some(path) = &self.path else {
            return false;
        };

        info!(template = %path.display(), "reloading HTML template");
        match read_template(self.fs.as_ref(), path) {
            Ok(text) => {
                debug!(bytes = text.len(), "template reloaded");
                self.text = text;
                true
            }
            Err(err) => {
                error!(template = %path.display(), error = %err, "keeping previous template");
                false
            }
        }
    }
}

fn read_template(fs: &dyn FileSystem, path: &PathBuf) -> Result<String> {
    if !fs.exists(path) {
        return Err(SpliceError::ConfigError(format!(
            "{} does not exist",
            path.display()
        )));
    }
    fs.read_to_string(path).map_err(|e| {
        SpliceError::ConfigError(format!(
            "could not read template file {} -- {e:#}",
            path.display()
        ))
    })
}
