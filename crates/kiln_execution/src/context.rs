//! Contexts handed from step to step.

use kiln_history::{AfterPreviousExecutionState, BeforeExecutionState, ChangeDetectionResult};

use crate::work::UnitOfWork;

/// The context an execution attempt starts from.
#[derive(Debug, Clone, Copy)]
pub struct WorkContext<'a> {
    work: &'a UnitOfWork,
}

impl<'a> WorkContext<'a> {
    /// Creates a context for `work`.
    pub fn new(work: &'a UnitOfWork) -> Self {
        Self { work }
    }

    /// The unit of work being executed.
    pub fn work(&self) -> &'a UnitOfWork {
        self.work
    }
}

/// A [`WorkContext`] enriched with the state needed for an incremental
/// decision.
///
/// `changes` is `None` when change tracking is disabled. When it is `Some`
/// and reports no changes, `after_previous_execution` is guaranteed to be
/// present: the change detector always reports missing history.
#[derive(Debug, Clone)]
pub struct IncrementalContext<'a> {
    work: &'a UnitOfWork,
    before_execution: BeforeExecutionState,
    after_previous_execution: Option<AfterPreviousExecutionState>,
    changes: Option<ChangeDetectionResult>,
}

impl<'a> IncrementalContext<'a> {
    /// Assembles an incremental context.
    pub fn new(
        work: &'a UnitOfWork,
        before_execution: BeforeExecutionState,
        after_previous_execution: Option<AfterPreviousExecutionState>,
        changes: Option<ChangeDetectionResult>,
    ) -> Self {
        Self {
            work,
            before_execution,
            after_previous_execution,
            changes,
        }
    }

    /// The unit of work being executed.
    pub fn work(&self) -> &'a UnitOfWork {
        self.work
    }

    /// The state observed right before execution.
    pub fn before_execution_state(&self) -> &BeforeExecutionState {
        &self.before_execution
    }

    /// The record of the last successful execution, if usable.
    pub fn after_previous_execution_state(&self) -> Option<&AfterPreviousExecutionState> {
        self.after_previous_execution.as_ref()
    }

    /// Detected changes, or `None` when change tracking is disabled.
    pub fn changes(&self) -> Option<&ChangeDetectionResult> {
        self.changes.as_ref()
    }
}
