//! Units of work: what gets decided on and executed.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use kiln_common::WorkId;
use kiln_files::FileTree;

use crate::error::BoxError;
use crate::outcome::ExecutionOutcome;

/// The action a unit of work performs when it is not up-to-date.
///
/// An action normally reports [`ExecutionOutcome::Executed`]. A caching layer
/// that restores outputs instead of producing them reports
/// [`ExecutionOutcome::FromCache`]. Reporting [`ExecutionOutcome::UpToDate`]
/// fails the attempt with an internal error.
pub trait WorkAction: Send + Sync {
    /// Performs the work.
    fn run(&self, work: &UnitOfWork) -> Result<ExecutionOutcome, BoxError>;
}

impl<F> WorkAction for F
where
    F: Fn(&UnitOfWork) -> Result<ExecutionOutcome, BoxError> + Send + Sync,
{
    fn run(&self, work: &UnitOfWork) -> Result<ExecutionOutcome, BoxError> {
        self(work)
    }
}

/// One schedulable piece of work with declared inputs and outputs.
///
/// Immutable once built. Cloning shares the action and the file trees.
#[derive(Clone)]
pub struct UnitOfWork {
    id: WorkId,
    display_name: String,
    input_files: BTreeMap<String, FileTree>,
    input_values: BTreeMap<String, String>,
    output_files: BTreeMap<String, FileTree>,
    action: Arc<dyn WorkAction>,
}

impl UnitOfWork {
    /// Starts declaring a unit of work keyed by `id`.
    pub fn builder(id: impl Into<WorkId>) -> UnitOfWorkBuilder {
        let id = id.into();
        UnitOfWorkBuilder {
            display_name: format!("task '{id}'"),
            id,
            input_files: BTreeMap::new(),
            input_values: BTreeMap::new(),
            output_files: BTreeMap::new(),
            action: None,
        }
    }

    /// The history key.
    pub fn id(&self) -> &WorkId {
        &self.id
    }

    /// Name used in diagnostics and change messages.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Declared input file properties.
    pub fn input_files(&self) -> &BTreeMap<String, FileTree> {
        &self.input_files
    }

    /// Declared scalar input properties.
    pub fn input_values(&self) -> &BTreeMap<String, String> {
        &self.input_values
    }

    /// Declared output file properties.
    pub fn output_files(&self) -> &BTreeMap<String, FileTree> {
        &self.output_files
    }

    /// The units of work that must run before this one, gathered from the
    /// producers of every input tree.
    pub fn producers(&self) -> BTreeSet<WorkId> {
        self.input_files
            .values()
            .flat_map(|tree| tree.producers())
            .collect()
    }

    /// Runs the action.
    pub fn run_action(&self) -> Result<ExecutionOutcome, BoxError> {
        self.action.run(self)
    }
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("input_files", &self.input_files)
            .field("input_values", &self.input_values)
            .field("output_files", &self.output_files)
            .finish_non_exhaustive()
    }
}

/// Builder for [`UnitOfWork`].
pub struct UnitOfWorkBuilder {
    id: WorkId,
    display_name: String,
    input_files: BTreeMap<String, FileTree>,
    input_values: BTreeMap<String, String>,
    output_files: BTreeMap<String, FileTree>,
    action: Option<Arc<dyn WorkAction>>,
}

impl UnitOfWorkBuilder {
    /// Sets the display name (defaults to `task '<id>'`).
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Declares an input file property.
    pub fn input_files(mut self, property: impl Into<String>, tree: FileTree) -> Self {
        self.input_files.insert(property.into(), tree);
        self
    }

    /// Declares a scalar input property.
    pub fn input_value(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.input_values.insert(property.into(), value.into());
        self
    }

    /// Declares an output file property.
    pub fn output_files(mut self, property: impl Into<String>, tree: FileTree) -> Self {
        self.output_files.insert(property.into(), tree);
        self
    }

    /// Sets the action from a closure.
    pub fn action<F>(self, action: F) -> Self
    where
        F: Fn(&UnitOfWork) -> Result<ExecutionOutcome, BoxError> + Send + Sync + 'static,
    {
        self.shared_action(Arc::new(action))
    }

    /// Sets an already shared action.
    pub fn shared_action(mut self, action: Arc<dyn WorkAction>) -> Self {
        self.action = Some(action);
        self
    }

    /// Finishes the declaration. Without an action the unit of work does
    /// nothing when executed.
    pub fn build(self) -> UnitOfWork {
        let action: Arc<dyn WorkAction> = match self.action {
            Some(action) => action,
            None => Arc::new(no_op),
        };
        UnitOfWork {
            id: self.id,
            display_name: self.display_name,
            input_files: self.input_files,
            input_values: self.input_values,
            output_files: self.output_files,
            action,
        }
    }
}

fn no_op(_: &UnitOfWork) -> Result<ExecutionOutcome, BoxError> {
    Ok(ExecutionOutcome::Executed)
}
