//! Error types produced by document sources.
//!
//! Errors are cloneable and comparable so the engine can attach them to
//! per-document failure reports. I/O errors are therefore carried as the
//! offending path plus the rendered message.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while listing or reading corpus documents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CorpusError {
    /// Reading a file or directory failed.
    #[error("i/o failure at {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// A document's bytes are not valid UTF-8.
    #[error("document at {} is not valid utf-8", path.display())]
    InvalidUtf8 { path: PathBuf },

    /// The corpus root (or an entity directory) is not a directory.
    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// The requested entity is not part of this corpus.
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    /// The requested version does not exist for the entity.
    #[error("entity '{entity}' has no version '{version}'")]
    UnknownVersion { entity: String, version: String },

    /// The reference marker cannot be used to recognize version labels.
    #[error("invalid reference marker '{0}': must be non-empty and contain no whitespace")]
    InvalidMarker(String),
}

impl CorpusError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        CorpusError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
