//! Building units of work from `kiln.toml` declarations.

use std::path::Path;
use std::sync::Arc;

use kiln_common::WorkId;
use kiln_config::{ConfigError, FileSpec, ResolvedWork};
use kiln_files::{FileTree, PatternSet};

use crate::error::ExecutionError;
use crate::work::{UnitOfWork, WorkAction};

/// Builds the lazy file tree a [`FileSpec`] declares, relative to `project_dir`.
pub fn file_tree_from_spec(project_dir: &Path, spec: &FileSpec) -> Result<FileTree, ExecutionError> {
    let tree = match (&spec.dir, spec.files.is_empty()) {
        (Some(dir), true) => FileTree::directory(project_dir.join(dir)),
        (None, false) => {
            let base = spec
                .base
                .as_ref()
                .map_or_else(|| project_dir.to_path_buf(), |b| project_dir.join(b));
            FileTree::files(base, &spec.files)
        }
        _ => {
            return Err(ConfigError::ValidationError(
                "a file property needs exactly one of `dir` and `files`".to_string(),
            )
            .into())
        }
    };

    if spec.include.is_empty() && spec.exclude.is_empty() {
        return Ok(tree);
    }
    let patterns = PatternSet::new()
        .include_all(&spec.include)?
        .exclude_all(&spec.exclude)?;
    Ok(tree.matching(patterns))
}

/// Turns a resolved declaration into a [`UnitOfWork`] running `action`.
///
/// Every input tree is marked as built by the units of work listed in
/// `depends_on`.
pub fn unit_of_work_from_config(
    project_dir: &Path,
    work: &ResolvedWork,
    action: Arc<dyn WorkAction>,
) -> Result<UnitOfWork, ExecutionError> {
    let producers: Vec<WorkId> = work.depends_on.iter().map(|d| WorkId::new(d)).collect();

    let mut builder = UnitOfWork::builder(work.name.as_str())
        .display_name(work.display_name.clone())
        .shared_action(action);
    for (property, spec) in &work.inputs {
        let tree = file_tree_from_spec(project_dir, spec)?;
        let tree = if producers.is_empty() {
            tree
        } else {
            tree.built_by_all(producers.iter().cloned())
        };
        builder = builder.input_files(property.clone(), tree);
    }
    for (property, value) in &work.values {
        builder = builder.input_value(property.clone(), value.clone());
    }
    for (property, spec) in &work.outputs {
        builder = builder.output_files(property.clone(), file_tree_from_spec(project_dir, spec)?);
    }
    Ok(builder.build())
}
