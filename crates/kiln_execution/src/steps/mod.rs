//! The stages of the execution pipeline, outermost first.

mod execute;
mod resolve_changes;
mod skip_up_to_date;
mod snapshot_outputs;
mod store_history;

pub use execute::ExecuteStep;
pub use resolve_changes::ResolveChangesStep;
pub use skip_up_to_date::{SkipUpToDateStep, CHANGE_TRACKING_DISABLED};
pub use snapshot_outputs::SnapshotOutputsStep;
pub use store_history::StoreHistoryStep;

use kiln_diagnostics::{Category, DiagnosticCode};

/// A unit of work is executed; the message lists the reasons.
pub(crate) const NOT_UP_TO_DATE: DiagnosticCode = DiagnosticCode::new(Category::Execution, 1);
/// A unit of work is skipped as up-to-date.
pub(crate) const SKIPPED_UP_TO_DATE: DiagnosticCode = DiagnosticCode::new(Category::Execution, 2);
/// The decision for a unit of work starts.
pub(crate) const DETERMINING: DiagnosticCode = DiagnosticCode::new(Category::Execution, 3);
/// No usable history was found.
pub(crate) const HISTORY_UNUSABLE: DiagnosticCode = DiagnosticCode::new(Category::History, 1);
/// A new history record was written.
pub(crate) const HISTORY_STORED: DiagnosticCode = DiagnosticCode::new(Category::History, 2);
