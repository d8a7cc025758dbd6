//! Error types for history operations.

use std::path::PathBuf;

use kiln_files::FileTreeError;

/// Errors that can occur while fingerprinting or persisting history.
///
/// Loading history is fail-safe and never produces these: an unreadable or
/// incompatible record is reported as absent. Errors surface when resolving
/// declared files fails or when a new record cannot be written.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// A history file could not be read or written.
    #[error("history I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A file belonging to a fingerprinted tree could not be hashed.
    #[error("failed to hash {path}: {source}")]
    Hash {
        /// The file being hashed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Resolving a declared file tree failed.
    #[error("failed to resolve property '{property}': {source}")]
    Resolve {
        /// The property whose tree failed to resolve.
        property: String,
        /// The resolution failure.
        #[source]
        source: FileTreeError,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

impl HistoryError {
    /// Returns the file tree error behind a resolution failure, if any.
    pub fn as_resolution_error(&self) -> Option<&FileTreeError> {
        match self {
            HistoryError::Resolve { source, .. } => Some(source),
            _ => None,
        }
    }
}
