// src/build/mod.rs

//! Producing the artifact.
//!
//! - [`walk`] gathers CSS and JavaScript from the input directory.
//! - [`template`] parses templates and fills their slots.
//! - [`sink`] writes finished documents (atomic file replace or stdout).
//! - [`executor`] ties these together and provides the [`BuildBackend`]
//!   the runtime dispatches to.

pub mod executor;
pub mod sink;
pub mod template;
pub mod walk;

pub use executor::{
    execute_build, render_document, BuildBackend, BuildContext, BuildRequest, LocalBuildBackend,
};
pub use sink::{ArtifactSink, SinkTarget};
pub use template::{Template, TemplateError, TemplateSource, DEFAULT_TEMPLATE};
pub use walk::{collect_sources, SourceBundle};
