//! The incremental execution core.
//!
//! A [`UnitOfWork`] declares lazy input and output file trees plus an action.
//! [`ExecutionEngine::execute`] runs it through a fixed pipeline of steps:
//!
//! 1. [`ResolveChangesStep`] loads history, fingerprints the current state and
//!    detects changes.
//! 2. [`StoreHistoryStep`] records the outcome of a successful execution.
//! 3. [`SkipUpToDateStep`] decides between reusing the previous outputs and
//!    executing.
//! 4. [`SnapshotOutputsStep`] fingerprints the outputs the action produced.
//! 5. [`ExecuteStep`] runs the action.
//!
//! Each step owns the step after it and may either short-circuit or delegate.

#![warn(missing_docs)]

pub mod context;
pub mod declare;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod result;
pub mod step;
pub mod steps;
pub mod work;

pub use context::{IncrementalContext, WorkContext};
pub use declare::{file_tree_from_spec, unit_of_work_from_config};
pub use engine::{ExecutionEngine, TOOL_VERSION};
pub use error::{BoxError, ExecutionError};
pub use outcome::ExecutionOutcome;
pub use result::{SnapshotResult, UpToDateResult};
pub use step::Step;
pub use steps::{
    ExecuteStep, ResolveChangesStep, SkipUpToDateStep, SnapshotOutputsStep, StoreHistoryStep,
    CHANGE_TRACKING_DISABLED,
};
pub use work::{UnitOfWork, UnitOfWorkBuilder, WorkAction};
