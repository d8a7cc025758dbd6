//! Error types for file tree composition and resolution.

use std::path::PathBuf;

/// Errors raised while composing or visiting a file tree.
///
/// Composition only fails for invalid patterns. Resolution failures name the
/// path involved so that a missing root is never confused with an empty tree.
#[derive(Debug, thiserror::Error)]
pub enum FileTreeError {
    /// The root directory of a directory tree does not exist.
    #[error("directory tree root {path} does not exist")]
    MissingRoot {
        /// The missing root.
        path: PathBuf,
    },

    /// The root of a directory tree exists but is not a directory.
    #[error("directory tree root {path} is not a directory")]
    NotADirectory {
        /// The offending root.
        path: PathBuf,
    },

    /// A file named by an explicit file set does not exist.
    #[error("file {path} does not exist")]
    MissingFile {
        /// The missing file.
        path: PathBuf,
    },

    /// An I/O error occurred while walking or inspecting a path.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An include or exclude pattern has invalid syntax.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern text.
        pattern: String,
        /// Description of the syntax problem.
        reason: String,
    },
}

impl FileTreeError {
    /// Returns `true` for errors raised while composing a tree rather than
    /// while resolving it.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, FileTreeError::InvalidPattern { .. })
    }
}
