//! Error types for layout, codec and store operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A referenced file (artifact, lens list, ...) does not exist.
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A durable write could not complete.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Unparseable document, or an encoded array that breaks codec invariants.
    #[error("corrupt artifact: {0}")]
    CorruptArtifact(String),

    /// Input to `encode` that cannot be represented unambiguously.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),
}

impl Error {
    /// Classify a read error: missing files become `NotFound`.
    pub(crate) fn from_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Error::NotFound { path }
        } else {
            Error::Read { path, source }
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::WriteFailure {
            path: path.into(),
            source,
        }
    }
}
