use std::sync::Arc;

use kiln_common::InternalError;
use kiln_diagnostics::{Diagnostic, DiagnosticSink, Severity};

use super::{DETERMINING, NOT_UP_TO_DATE, SKIPPED_UP_TO_DATE};
use crate::context::IncrementalContext;
use crate::error::ExecutionError;
use crate::outcome::ExecutionOutcome;
use crate::result::{SnapshotResult, UpToDateResult};
use crate::step::Step;
use crate::work::UnitOfWork;

/// The single reason reported when change tracking is turned off.
pub const CHANGE_TRACKING_DISABLED: &str = "Change tracking is disabled.";

/// Decides whether a unit of work can reuse its previous outputs.
///
/// With detected changes present and empty, the previous outputs and origin
/// are returned as they were recorded and the delegate is not invoked. In
/// every other case the reasons are reported, the delegate runs once, and its
/// result is wrapped together with those reasons. Delegate failures
/// propagate untouched. A delegate claiming [`ExecutionOutcome::UpToDate`]
/// is an internal error, since only this step may decide on reuse.
pub struct SkipUpToDateStep<D> {
    delegate: D,
    sink: Arc<DiagnosticSink>,
}

impl<D> SkipUpToDateStep<D> {
    /// Wraps `delegate`, reporting decisions to `sink`.
    pub fn new(delegate: D, sink: Arc<DiagnosticSink>) -> Self {
        Self { delegate, sink }
    }

    fn execute_because<'a>(
        &self,
        reasons: Vec<String>,
        ctx: &IncrementalContext<'a>,
    ) -> Result<UpToDateResult, ExecutionError>
    where
        D: Step<IncrementalContext<'a>, Output = SnapshotResult>,
    {
        self.report_reasons(&reasons, ctx.work());
        let snapshot = self.delegate.execute(ctx)?;
        if snapshot.outcome() == ExecutionOutcome::UpToDate {
            return Err(InternalError::new(format!(
                "{} executed but its action reported {}",
                ctx.work().display_name(),
                ExecutionOutcome::UpToDate
            ))
            .into());
        }
        Ok(UpToDateResult::Executed { reasons, snapshot })
    }

    fn report_reasons(&self, reasons: &[String], work: &UnitOfWork) {
        if !self.sink.is_enabled(Severity::Info) {
            return;
        }
        let mut message = format!("{} is not up-to-date because:", capitalize(work.display_name()));
        for reason in reasons {
            message.push_str("\n  ");
            message.push_str(reason);
        }
        self.sink
            .emit(Diagnostic::info(NOT_UP_TO_DATE, message).with_subject(work.id().as_str()));
    }
}

impl<'a, D> Step<IncrementalContext<'a>> for SkipUpToDateStep<D>
where
    D: Step<IncrementalContext<'a>, Output = SnapshotResult>,
{
    type Output = UpToDateResult;

    fn execute(&self, ctx: &IncrementalContext<'a>) -> Result<UpToDateResult, ExecutionError> {
        let work = ctx.work();
        if self.sink.is_enabled(Severity::Debug) {
            self.sink.emit(
                Diagnostic::debug(
                    DETERMINING,
                    format!("Determining if {} is up-to-date", work.display_name()),
                )
                .with_subject(work.id().as_str()),
            );
        }

        match ctx.changes() {
            Some(changes) if !changes.has_changes() => {
                let previous = ctx.after_previous_execution_state().ok_or_else(|| {
                    InternalError::new(format!(
                        "{} reported no changes but has no execution history",
                        work.display_name()
                    ))
                })?;
                if self.sink.is_enabled(Severity::Info) {
                    self.sink.emit(
                        Diagnostic::info(
                            SKIPPED_UP_TO_DATE,
                            format!("Skipping {} as it is up-to-date.", work.display_name()),
                        )
                        .with_subject(work.id().as_str()),
                    );
                }
                Ok(UpToDateResult::Reused {
                    outputs: previous.outputs().clone(),
                    origin: previous.origin().clone(),
                })
            }
            Some(changes) => self.execute_because(changes.messages().to_vec(), ctx),
            None => self.execute_because(vec![CHANGE_TRACKING_DISABLED.to_string()], ctx),
        }
    }
}

/// Upper-cases the first character.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
