use std::time::Instant;

use kiln_history::{BuildInvocationId, Fingerprinter, OriginMetadata};

use crate::context::IncrementalContext;
use crate::error::ExecutionError;
use crate::outcome::ExecutionOutcome;
use crate::result::SnapshotResult;
use crate::step::Step;

/// Runs the delegate, then fingerprints the outputs it left behind and
/// records fresh origin metadata for them.
pub struct SnapshotOutputsStep<D> {
    delegate: D,
    invocation: BuildInvocationId,
}

impl<D> SnapshotOutputsStep<D> {
    /// Wraps `delegate`; outputs are attributed to `invocation`.
    pub fn new(delegate: D, invocation: BuildInvocationId) -> Self {
        Self {
            delegate,
            invocation,
        }
    }
}

impl<'a, D> Step<IncrementalContext<'a>> for SnapshotOutputsStep<D>
where
    D: Step<IncrementalContext<'a>, Output = ExecutionOutcome>,
{
    type Output = SnapshotResult;

    fn execute(&self, ctx: &IncrementalContext<'a>) -> Result<SnapshotResult, ExecutionError> {
        let work = ctx.work();
        let started = Instant::now();
        let outcome = self.delegate.execute(ctx)?;
        let elapsed = started.elapsed();

        let outputs = Fingerprinter::fingerprint_outputs(work.output_files())?;
        let origin = OriginMetadata::new(self.invocation.clone(), work.id().clone(), elapsed);
        Ok(SnapshotResult::new(outcome, outputs, origin))
    }
}
