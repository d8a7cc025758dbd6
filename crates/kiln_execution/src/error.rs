//! Error types for executing units of work.

use std::path::PathBuf;

use kiln_common::{InternalError, WorkId};
use kiln_config::ConfigError;
use kiln_files::FileTreeError;
use kiln_history::HistoryError;

/// A boxed error returned by a unit of work's action.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort an execution attempt.
///
/// None of these is ever converted into a reuse result, and no history is
/// recorded for an attempt that fails.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The unit of work's action failed.
    #[error("execution of {work} failed: {source}")]
    ActionFailed {
        /// The failing unit of work.
        work: WorkId,
        /// The action's error.
        source: BoxError,
    },

    /// Fingerprinting or persisting history failed.
    #[error(transparent)]
    History(#[from] HistoryError),

    /// A file tree could not be composed or resolved.
    #[error(transparent)]
    Files(#[from] FileTreeError),

    /// A declaration in the configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An output location could not be prepared.
    #[error("failed to prepare output location {path}: {source}")]
    Io {
        /// The location being created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An internal invariant was violated.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl ExecutionError {
    /// Returns `true` for errors raised by the action itself rather than by
    /// the execution machinery.
    pub fn is_action_failure(&self) -> bool {
        matches!(self, ExecutionError::ActionFailed { .. })
    }
}
