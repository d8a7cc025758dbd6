//! The entry point a scheduler calls once per unit of work.

use std::path::Path;
use std::sync::Arc;

use kiln_config::{ExecutionConfig, KilnConfig};
use kiln_diagnostics::DiagnosticSink;
use kiln_history::{BuildInvocationId, ChangeDetector, HistoryStore};

use crate::context::WorkContext;
use crate::error::ExecutionError;
use crate::result::UpToDateResult;
use crate::step::Step;
use crate::steps::{
    ExecuteStep, ResolveChangesStep, SkipUpToDateStep, SnapshotOutputsStep, StoreHistoryStep,
};
use crate::work::UnitOfWork;

/// Version recorded in history records; records from other versions are ignored.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

type Pipeline =
    ResolveChangesStep<StoreHistoryStep<SkipUpToDateStep<SnapshotOutputsStep<ExecuteStep>>>>;

/// Decides and executes units of work.
///
/// The engine is `Send + Sync`: a scheduler may call [`execute`](Self::execute)
/// for different units of work from several threads at once. Calls for the
/// same unit of work must not overlap.
pub struct ExecutionEngine {
    pipeline: Pipeline,
    invocation: BuildInvocationId,
    sink: Arc<DiagnosticSink>,
}

impl ExecutionEngine {
    /// Composes the pipeline around `history`.
    pub fn new(history: HistoryStore, settings: &ExecutionConfig, sink: Arc<DiagnosticSink>) -> Self {
        let invocation = BuildInvocationId::generate();
        let detector = settings
            .change_tracking
            .then(|| ChangeDetector::new(settings.max_change_messages));

        let execute = ExecuteStep::new();
        let snapshot = SnapshotOutputsStep::new(execute, invocation.clone());
        let skip = SkipUpToDateStep::new(snapshot, Arc::clone(&sink));
        let store = StoreHistoryStep::new(skip, history.clone(), Arc::clone(&sink));
        let pipeline = ResolveChangesStep::new(store, history, detector, Arc::clone(&sink));

        tracing::debug!(invocation = %invocation, "execution engine ready");
        Self {
            pipeline,
            invocation,
            sink,
        }
    }

    /// Creates an engine from a loaded configuration. The history directory
    /// is resolved against `project_dir`.
    pub fn from_config(project_dir: &Path, config: &KilnConfig) -> Self {
        let sink = Arc::new(
            DiagnosticSink::with_threshold(config.diagnostics.level)
                .retaining(config.diagnostics.retain),
        );
        let history = HistoryStore::new(project_dir.join(&config.history.dir), TOOL_VERSION);
        Self::new(history, &config.execution, sink)
    }

    /// Runs one unit of work through the pipeline.
    pub fn execute(&self, work: &UnitOfWork) -> Result<UpToDateResult, ExecutionError> {
        let result = self.pipeline.execute(&WorkContext::new(work));
        match &result {
            Ok(r) => tracing::debug!(work = %work.id(), outcome = %r.outcome(), "execution finished"),
            Err(e) => tracing::debug!(work = %work.id(), error = %e, "execution failed"),
        }
        result
    }

    /// The identifier shared by every output this engine produces.
    pub fn invocation_id(&self) -> &BuildInvocationId {
        &self.invocation
    }

    /// The sink the pipeline reports to. Callers drain it with
    /// [`DiagnosticSink::take_all`]; between drains it holds at most its
    /// retention limit.
    pub fn sink(&self) -> &Arc<DiagnosticSink> {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::ExecutionOutcome;
    use kiln_config::load_config_from_str;

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExecutionEngine>();
    }

    #[test]
    fn from_config_uses_configured_history_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from_str(
            r#"
[history]
dir = "state/hist"

[diagnostics]
level = "debug"
"#,
        )
        .unwrap();
        let engine = ExecutionEngine::from_config(dir.path(), &config);
        assert_eq!(engine.sink().threshold(), kiln_diagnostics::Severity::Debug);

        let work = UnitOfWork::builder(":noop").build();
        let result = engine.execute(&work).unwrap();
        assert_eq!(result.outcome(), ExecutionOutcome::Executed);
        assert!(dir.path().join("state/hist").is_dir());
    }

    #[test]
    fn configured_retention_bounds_the_shared_sink() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from_str("[diagnostics]\nretain = 2\n").unwrap();
        let engine = ExecutionEngine::from_config(dir.path(), &config);

        for id in [":a", ":b", ":c"] {
            engine.execute(&UnitOfWork::builder(id).build()).unwrap();
        }
        let kept: Vec<_> = engine
            .sink()
            .take_all()
            .into_iter()
            .filter_map(|d| d.subject)
            .collect();
        assert_eq!(kept, [":b", ":c"]);
    }
}
