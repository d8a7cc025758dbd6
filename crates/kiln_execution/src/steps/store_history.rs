use std::sync::Arc;

use kiln_diagnostics::{Diagnostic, DiagnosticSink, Severity};
use kiln_history::{AfterPreviousExecutionState, HistoryStore};

use super::HISTORY_STORED;
use crate::context::IncrementalContext;
use crate::error::ExecutionError;
use crate::result::UpToDateResult;
use crate::step::Step;

/// Records the state left behind by a successful execution.
///
/// Nothing is written when the delegate fails or when the previous outputs
/// were reused as up-to-date.
pub struct StoreHistoryStep<D> {
    delegate: D,
    store: HistoryStore,
    sink: Arc<DiagnosticSink>,
}

impl<D> StoreHistoryStep<D> {
    /// Wraps `delegate`, writing records to `store`.
    pub fn new(delegate: D, store: HistoryStore, sink: Arc<DiagnosticSink>) -> Self {
        Self {
            delegate,
            store,
            sink,
        }
    }
}

impl<'a, D> Step<IncrementalContext<'a>> for StoreHistoryStep<D>
where
    D: Step<IncrementalContext<'a>, Output = UpToDateResult>,
{
    type Output = UpToDateResult;

    fn execute(&self, ctx: &IncrementalContext<'a>) -> Result<UpToDateResult, ExecutionError> {
        let result = self.delegate.execute(ctx)?;
        if let UpToDateResult::Executed { .. } = result {
            let work = ctx.work();
            let state = AfterPreviousExecutionState::new(
                ctx.before_execution_state(),
                result.final_outputs().clone(),
                result.origin_metadata().clone(),
            );
            self.store.store(work.id(), &state)?;
            if self.sink.is_enabled(Severity::Debug) {
                self.sink.emit(
                    Diagnostic::debug(
                        HISTORY_STORED,
                        format!("Stored execution history for {}", work.display_name()),
                    )
                    .with_subject(work.id().as_str())
                    .with_note(format!("record: {}", self.store.record_path(work.id()).display())),
                );
            }
        }
        Ok(result)
    }
}
