//! The step abstraction the pipeline is built from.

use crate::error::ExecutionError;

/// One stage of the execution pipeline.
///
/// A step receives a context, and either produces its output itself or
/// delegates to the step it wraps. Failures of the wrapped step propagate
/// unchanged.
pub trait Step<C> {
    /// What the step produces.
    type Output;

    /// Runs the step.
    fn execute(&self, ctx: &C) -> Result<Self::Output, ExecutionError>;
}
