// src/types.rs

use std::str::FromStr;

use serde::Deserialize;

/// What to do when a viewer handshake arrives while another viewer is
/// still connected.
///
/// - `Replace`: close the current connection and install the new one
///   (default behaviour).
/// - `Reject`: keep the current connection; the newcomer is closed right
///   after the upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecondViewerPolicy {
    #[default]
    Replace,
    Reject,
}

impl FromStr for SecondViewerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(SecondViewerPolicy::Replace),
            "reject" => Ok(SecondViewerPolicy::Reject),
            other => Err(format!(
                "invalid on_second_viewer: {other} (expected \"replace\" or \"reject\")"
            )),
        }
    }
}

/// Which watched target a batch of change events came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchTarget {
    /// The recursively watched input directory.
    Source,
    /// The template file (watched through its parent directory).
    Template,
}

/// The two kinds of source file that are spliced into the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Css,
    Javascript,
}

impl ContentKind {
    /// Classify a (lower-cased, dot-less) file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "css" => Some(ContentKind::Css),
            "js" => Some(ContentKind::Javascript),
            _ => None,
        }
    }

    /// Classify a path by its extension, ignoring case.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::from_extension(&ext)
    }
}
