use std::path::Path;

use kiln_files::{FileTree, LeafSource};

use crate::context::IncrementalContext;
use crate::error::ExecutionError;
use crate::outcome::ExecutionOutcome;
use crate::step::Step;

/// Runs the unit of work's action.
///
/// Output directories, and the parent directories of declared output files,
/// are created first.
#[derive(Debug, Default)]
pub struct ExecuteStep;

impl ExecuteStep {
    /// Creates the step.
    pub fn new() -> Self {
        Self
    }
}

impl<'a> Step<IncrementalContext<'a>> for ExecuteStep {
    type Output = ExecutionOutcome;

    fn execute(&self, ctx: &IncrementalContext<'a>) -> Result<ExecutionOutcome, ExecutionError> {
        let work = ctx.work();
        for tree in work.output_files().values() {
            prepare_outputs(tree)?;
        }
        tracing::debug!(work = %work.id(), "running action");
        work.run_action().map_err(|source| ExecutionError::ActionFailed {
            work: work.id().clone(),
            source,
        })
    }
}

fn prepare_outputs(tree: &FileTree) -> Result<(), ExecutionError> {
    for leaf in tree.resolve_leaves() {
        match leaf.source() {
            LeafSource::Directory { root } => create_dir(root)?,
            LeafSource::Files { base, files } => {
                for file in files {
                    if let Some(parent) = base.join(file).parent() {
                        create_dir(parent)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn create_dir(path: &Path) -> Result<(), ExecutionError> {
    std::fs::create_dir_all(path).map_err(|e| ExecutionError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
