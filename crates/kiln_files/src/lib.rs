//! Lazy, composable file trees.
//!
//! A [`FileTree`] describes a set of files without touching the filesystem.
//! Trees are built from leaves (a directory walk or an explicit file list),
//! combined with [`FileTree::union`], and narrowed with
//! [`FileTree::matching`] or [`FileTree::filter`]. Nothing is read until
//! [`FileTree::visit`] is called, and every visit reflects the current state
//! of the disk.
//!
//! Filters are applied per leaf: filtering a union refines each contributing
//! leaf on its own, so root-relative patterns stay relative to the root that
//! produced each entry.

#![warn(missing_docs)]

pub mod entry;
pub mod error;
pub mod leaf;
pub mod pattern;
pub mod refinement;
pub mod tree;

pub use entry::{FileEntry, FileVisitor};
pub use error::FileTreeError;
pub use leaf::{LeafSource, LeafTree};
pub use pattern::PatternSet;
pub use refinement::{EntryPredicate, Refinement};
pub use tree::FileTree;
