//! Leaf trees: the sub-trees a composite resolves into.

use std::path::{Path, PathBuf};

use crate::entry::{FileEntry, FileVisitor};
use crate::error::FileTreeError;
use crate::refinement::Refinement;

/// Where a leaf's entries come from.
#[derive(Debug, Clone)]
pub enum LeafSource {
    /// Every entry below `root`, walked recursively.
    Directory {
        /// The directory walked.
        root: PathBuf,
    },
    /// An explicit, ordered list of paths relative to `base`.
    Files {
        /// Directory the relative paths are resolved against.
        base: PathBuf,
        /// Relative paths, `/`-separated. Duplicates are kept.
        files: Vec<String>,
    },
}

/// A concrete set of files plus the refinements narrowing it.
///
/// Constructing or refining a leaf never touches the disk. Visiting walks it
/// afresh every time; entries of a directory are visited in file name order
/// with each directory reported before its contents.
#[derive(Debug, Clone)]
pub struct LeafTree {
    source: LeafSource,
    refinements: Vec<Refinement>,
}

impl LeafTree {
    /// A leaf covering everything below `root`.
    pub fn directory(root: impl Into<PathBuf>) -> Self {
        Self {
            source: LeafSource::Directory { root: root.into() },
            refinements: Vec::new(),
        }
    }

    /// A leaf covering an explicit list of files under `base`.
    pub fn files<I, S>(base: impl Into<PathBuf>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            source: LeafSource::Files {
                base: base.into(),
                files: files
                    .into_iter()
                    .map(|f| normalize(f.as_ref()))
                    .collect(),
            },
            refinements: Vec::new(),
        }
    }

    /// The leaf's source.
    pub fn source(&self) -> &LeafSource {
        &self.source
    }

    /// The refinements applied so far, oldest first.
    pub fn refinements(&self) -> &[Refinement] {
        &self.refinements
    }

    /// Returns a copy of this leaf further narrowed by `refinement`.
    pub fn refined(&self, refinement: Refinement) -> Self {
        let mut leaf = self.clone();
        leaf.refinements.push(refinement);
        leaf
    }

    /// Human-readable description used in diagnostics.
    pub fn display_name(&self) -> String {
        match &self.source {
            LeafSource::Directory { root } => format!("directory '{}'", root.display()),
            LeafSource::Files { base, files } if files.len() == 1 => {
                format!("file '{}'", base.join(&files[0]).display())
            }
            LeafSource::Files { base, files } => {
                format!("{} files in '{}'", files.len(), base.display())
            }
        }
    }

    /// Walks the leaf, reporting admitted entries to `visitor`.
    pub fn visit(&self, visitor: &mut dyn FileVisitor) -> Result<(), FileTreeError> {
        self.visit_inner(visitor, false)
    }

    /// Like [`visit`](Self::visit), but a missing root or listed file is
    /// treated as contributing no entries. Used for outputs that may not
    /// have been produced yet.
    pub fn visit_present(&self, visitor: &mut dyn FileVisitor) -> Result<(), FileTreeError> {
        self.visit_inner(visitor, true)
    }

    fn visit_inner(
        &self,
        visitor: &mut dyn FileVisitor,
        skip_missing: bool,
    ) -> Result<(), FileTreeError> {
        match &self.source {
            LeafSource::Directory { root } => {
                let meta = match std::fs::metadata(root) {
                    Ok(meta) => meta,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        if skip_missing {
                            return Ok(());
                        }
                        return Err(FileTreeError::MissingRoot { path: root.clone() });
                    }
                    Err(e) => {
                        return Err(FileTreeError::Io {
                            path: root.clone(),
                            source: e,
                        })
                    }
                };
                if !meta.is_dir() {
                    return Err(FileTreeError::NotADirectory { path: root.clone() });
                }
                self.walk_dir(root, "", visitor)
            }
            LeafSource::Files { base, files } => {
                for relative in files {
                    let path = base.join(relative);
                    let meta = match std::fs::metadata(&path) {
                        Ok(meta) => meta,
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                            if skip_missing {
                                continue;
                            }
                            return Err(FileTreeError::MissingFile { path });
                        }
                        Err(e) => return Err(FileTreeError::Io { path, source: e }),
                    };
                    let entry = entry_for(path, relative.clone(), &meta);
                    self.report(&entry, visitor);
                }
                Ok(())
            }
        }
    }

    /// Recursively walks a directory, children sorted by file name.
    fn walk_dir(
        &self,
        dir: &Path,
        prefix: &str,
        visitor: &mut dyn FileVisitor,
    ) -> Result<(), FileTreeError> {
        let io_err = |source| FileTreeError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut children = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            children.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
        children.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, path) in children {
            let relative = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };
            let meta = std::fs::metadata(&path).map_err(|e| FileTreeError::Io {
                path: path.clone(),
                source: e,
            })?;
            if meta.is_dir() {
                if self.refinements.iter().any(|r| r.prunes_dir(&relative)) {
                    continue;
                }
                let entry = entry_for(path.clone(), relative.clone(), &meta);
                self.report(&entry, visitor);
                self.walk_dir(&path, &relative, visitor)?;
            } else {
                let entry = entry_for(path, relative, &meta);
                self.report(&entry, visitor);
            }
        }
        Ok(())
    }

    fn admits(&self, entry: &FileEntry) -> bool {
        self.refinements.iter().all(|r| r.admits(entry))
    }

    fn report(&self, entry: &FileEntry, visitor: &mut dyn FileVisitor) {
        if !self.admits(entry) {
            return;
        }
        if entry.is_dir() {
            visitor.visit_dir(entry);
        } else {
            visitor.visit_file(entry);
        }
    }
}

fn entry_for(path: PathBuf, relative: String, meta: &std::fs::Metadata) -> FileEntry {
    let is_dir = meta.is_dir();
    let len = if is_dir { 0 } else { meta.len() };
    FileEntry::new(path, relative, is_dir, len)
}

/// Normalizes a user-supplied relative path to `/` separators without a leading `./`.
fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").unwrap_or(&path).to_string()
}
