//! The single filtering capability shared by every filter node.

use std::fmt;
use std::sync::Arc;

use crate::entry::FileEntry;
use crate::pattern::PatternSet;

/// A shareable predicate over visited entries.
#[derive(Clone)]
pub struct EntryPredicate(Arc<dyn Fn(&FileEntry) -> bool + Send + Sync>);

impl EntryPredicate {
    /// Wraps a closure.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&FileEntry) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Evaluates the predicate.
    pub fn test(&self, entry: &FileEntry) -> bool {
        (self.0)(entry)
    }
}

impl fmt::Debug for EntryPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryPredicate(*)")
    }
}

/// A narrowing applied to a leaf at visit time.
///
/// Pattern sets and predicates both reduce to "which entries of a leaf
/// survive". A leaf holds a chain of refinements and admits an entry only if
/// every refinement does, so successive filters intersect.
#[derive(Debug, Clone)]
pub enum Refinement {
    /// Root-relative include/exclude patterns.
    Patterns(PatternSet),
    /// An arbitrary predicate.
    Predicate(EntryPredicate),
}

impl Refinement {
    /// Returns `true` if the entry is kept.
    pub fn admits(&self, entry: &FileEntry) -> bool {
        match self {
            Refinement::Patterns(patterns) => patterns.matches(entry.relative_path()),
            Refinement::Predicate(predicate) => predicate.test(entry),
        }
    }

    /// Returns `true` if nothing below the directory can be admitted.
    ///
    /// Only exclude patterns prune; predicates and includes are evaluated on
    /// each entry.
    pub fn prunes_dir(&self, relative_path: &str) -> bool {
        match self {
            Refinement::Patterns(patterns) => patterns.prunes_dir(relative_path),
            Refinement::Predicate(_) => false,
        }
    }
}

impl From<PatternSet> for Refinement {
    fn from(patterns: PatternSet) -> Self {
        Refinement::Patterns(patterns)
    }
}

impl From<EntryPredicate> for Refinement {
    fn from(predicate: EntryPredicate) -> Self {
        Refinement::Predicate(predicate)
    }
}
