use std::sync::Arc;

use kiln_diagnostics::{Diagnostic, DiagnosticSink, Severity};
use kiln_history::{BeforeExecutionState, ChangeDetector, Fingerprinter, HistoryStore};

use super::HISTORY_UNUSABLE;
use crate::context::{IncrementalContext, WorkContext};
use crate::error::ExecutionError;
use crate::result::UpToDateResult;
use crate::step::Step;

/// Loads history, captures the current state and detects changes.
///
/// With no detector configured, change tracking is disabled: detection is
/// skipped and the delegate receives no change result at all.
pub struct ResolveChangesStep<D> {
    delegate: D,
    store: HistoryStore,
    detector: Option<ChangeDetector>,
    sink: Arc<DiagnosticSink>,
}

impl<D> ResolveChangesStep<D> {
    /// Wraps `delegate`. Pass `None` as `detector` to disable change tracking.
    pub fn new(
        delegate: D,
        store: HistoryStore,
        detector: Option<ChangeDetector>,
        sink: Arc<DiagnosticSink>,
    ) -> Self {
        Self {
            delegate,
            store,
            detector,
            sink,
        }
    }
}

impl<'a, D> Step<WorkContext<'a>> for ResolveChangesStep<D>
where
    D: Step<IncrementalContext<'a>, Output = UpToDateResult>,
{
    type Output = UpToDateResult;

    fn execute(&self, ctx: &WorkContext<'a>) -> Result<UpToDateResult, ExecutionError> {
        let work = ctx.work();
        let previous = self.store.load(work.id());
        if previous.is_none() && self.sink.is_enabled(Severity::Debug) {
            self.sink.emit(
                Diagnostic::debug(
                    HISTORY_UNUSABLE,
                    format!("No usable execution history for {}", work.display_name()),
                )
                .with_subject(work.id().as_str()),
            );
        }

        let before = BeforeExecutionState {
            input_values: Fingerprinter::hash_values(work.input_values()),
            input_files: Fingerprinter::fingerprint_properties(work.input_files())?,
            outputs_before_execution: Fingerprinter::fingerprint_outputs(work.output_files())?,
        };
        let changes = self
            .detector
            .map(|detector| detector.detect(work.display_name(), &before, previous.as_ref()));

        let incremental = IncrementalContext::new(work, before, previous, changes);
        self.delegate.execute(&incremental)
    }
}
