// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::build::template::TemplateError;

#[derive(Error, Debug)]
pub enum SpliceError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Template error: {0}")]
    TemplateError(#[from] TemplateError),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SpliceError>;
