//! Persistence error types.

use std::path::PathBuf;

use thiserror::Error;

use super::format::{ArtifactKind, DecodeError, EncodeError};

/// Errors produced while reading an artifact.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Binary(#[from] DecodeError),

    /// JSON envelope written by a newer format.
    #[error("unsupported artifact format version {0}")]
    UnsupportedFormatVersion(u32),

    /// The file holds a different artifact than the one requested.
    #[error("expected {expected} artifact, found {actual}")]
    KindMismatch {
        expected: ArtifactKind,
        actual: ArtifactKind,
    },

    /// The artifact decoded but its content is inconsistent.
    #[error("invalid artifact: {0}")]
    Validation(String),

    /// Declared class names disagree with 0 = edible, 1 = poisonous.
    #[error("class label {label} is named {name:?}, expected {expected}")]
    LabelConvention {
        label: i64,
        name: String,
        expected: &'static str,
    },
}

/// Errors produced while writing an artifact.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Binary(#[from] EncodeError),
}

/// An artifact file could not be loaded.
#[derive(Debug, Error)]
#[error("failed to load {kind} artifact from {}: {source}", path.display())]
pub struct ArtifactLoadError {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    #[source]
    pub source: ReadError,
}

impl ArtifactLoadError {
    pub fn new(kind: ArtifactKind, path: impl Into<PathBuf>, source: ReadError) -> Self {
        Self {
            kind,
            path: path.into(),
            source,
        }
    }
}
