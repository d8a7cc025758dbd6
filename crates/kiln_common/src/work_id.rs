//! Identifiers for units of work.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The stable key of one schedulable unit of work (for example `:app:compile`).
///
/// Used to key execution history and to name the producers of a file tree.
/// Cloning is O(1).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkId(Arc<str>);

impl WorkId {
    /// Creates a work id from its textual key.
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    /// Returns the textual key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkId {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for WorkId {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

impl fmt::Display for WorkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for WorkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkId({})", self.0)
    }
}
