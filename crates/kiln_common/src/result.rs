//! Common result and error types for the Kiln build core.

/// The standard result type for operations that can only fail through a bug.
///
/// User-facing failures (unreadable inputs, failing actions, bad configuration)
/// have their own error types in the crates that raise them. `Err` here means a
/// violated internal invariant.
pub type KilnResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in Kiln, not a user input problem.
///
/// These errors should never occur during normal operation. If one does occur,
/// a stage was handed state that an earlier stage promised could not exist.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
