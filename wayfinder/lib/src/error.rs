use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by wayfinder operations.
#[derive(Debug, Error)]
pub enum WayfinderError {
    #[error("Invalid value for `{option}`: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },

    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid wrapper template `{template}`: {reason}")]
    InvalidWrapper { template: String, reason: String },

    #[error("Failed to parse config `{}`: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O failure on `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No pipeline stage named `{name}`")]
    UnknownStage { name: String },

    #[error("A pipeline stage named `{name}` is already registered")]
    DuplicateStage { name: String },

    #[error("Failed to write markdown: {0}")]
    Serialize(String),
}

impl WayfinderError {
    /// Builds an [`WayfinderError::Io`] tagged with the path that failed.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type WayfinderResult<T> = Result<T, WayfinderError>;
