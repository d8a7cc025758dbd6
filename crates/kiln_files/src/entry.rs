//! Entries reported while visiting a file tree.

use std::path::{Path, PathBuf};

/// One file or directory reached while visiting a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    path: PathBuf,
    relative_path: String,
    is_dir: bool,
    len: u64,
}

impl FileEntry {
    /// Creates an entry. `relative_path` uses `/` separators regardless of platform.
    pub fn new(path: PathBuf, relative_path: impl Into<String>, is_dir: bool, len: u64) -> Self {
        Self {
            path,
            relative_path: relative_path.into(),
            is_dir,
            len,
        }
    }

    /// Full path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the root of the leaf that produced this entry.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Final component of the relative path.
    pub fn name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }

    /// Whether the entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Size in bytes; zero for directories.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the entry has no content.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Receives the entries of a tree in visitation order.
///
/// Directories are reported before their contents.
pub trait FileVisitor {
    /// Called for every admitted directory entry.
    fn visit_dir(&mut self, _entry: &FileEntry) {}

    /// Called for every admitted file entry.
    fn visit_file(&mut self, entry: &FileEntry);
}

/// Adapts a closure into a visitor that sees both files and directories.
pub(crate) struct ClosureVisitor<F>(pub(crate) F);

impl<F: FnMut(&FileEntry)> FileVisitor for ClosureVisitor<F> {
    fn visit_dir(&mut self, entry: &FileEntry) {
        (self.0)(entry);
    }

    fn visit_file(&mut self, entry: &FileEntry) {
        (self.0)(entry);
    }
}
