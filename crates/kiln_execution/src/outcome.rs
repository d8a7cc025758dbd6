//! How an execution attempt ended.

use std::fmt;

/// The outcome of a successful execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionOutcome {
    /// Nothing changed; the previous outputs were reused.
    UpToDate,
    /// The action ran and produced fresh outputs.
    Executed,
    /// Outputs were restored by a caching layer below the decision step.
    FromCache,
}

impl ExecutionOutcome {
    /// Returns `true` if the outputs were not produced by running the action.
    pub fn is_reused(self) -> bool {
        !matches!(self, ExecutionOutcome::Executed)
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionOutcome::UpToDate => write!(f, "UP-TO-DATE"),
            ExecutionOutcome::Executed => write!(f, "EXECUTED"),
            ExecutionOutcome::FromCache => write!(f, "FROM-CACHE"),
        }
    }
}
