//! Content fingerprints of resolved file trees.

use std::collections::BTreeMap;
use std::path::Path;

use kiln_common::ContentHash;
use kiln_files::{FileEntry, FileTree, FileVisitor};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

/// Fingerprints of several file properties, keyed by property name.
pub type PropertyFingerprints = BTreeMap<String, FileCollectionFingerprint>;

/// The content digest of every entry of one resolved file tree.
///
/// Keys are root-relative, `/`-separated paths. Directories are recorded with
/// [`ContentHash::DIRECTORY`] so that an added or removed empty directory is
/// still observed as a change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCollectionFingerprint {
    entries: BTreeMap<String, ContentHash>,
}

impl FileCollectionFingerprint {
    /// Creates an empty fingerprint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `hash` for `path` unless the path was already recorded.
    ///
    /// A union may resolve the same relative path from two roots; the first
    /// occurrence in visitation order wins.
    pub fn insert(&mut self, path: impl Into<String>, hash: ContentHash) {
        self.entries.entry(path.into()).or_insert(hash);
    }

    /// Returns the hash recorded for `path`.
    pub fn get(&self, path: &str) -> Option<&ContentHash> {
        self.entries.get(path)
    }

    /// Returns `true` if `path` is recorded.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(path, hash)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContentHash)> {
        self.entries.iter().map(|(p, h)| (p.as_str(), h))
    }
}

impl<S: Into<String>> FromIterator<(S, ContentHash)> for FileCollectionFingerprint {
    fn from_iter<I: IntoIterator<Item = (S, ContentHash)>>(iter: I) -> Self {
        let mut fingerprint = Self::new();
        for (path, hash) in iter {
            fingerprint.insert(path, hash);
        }
        fingerprint
    }
}

/// Resolves file trees and hashes their contents.
///
/// Trees are walked on the calling thread; file contents are hashed in
/// parallel with rayon. Entry order is preserved so that duplicate paths
/// resolve deterministically.
pub struct Fingerprinter;

impl Fingerprinter {
    /// Computes the XXH3-128 hash of a single file.
    pub fn hash_file(path: &Path) -> Result<ContentHash, HistoryError> {
        let content = std::fs::read(path).map_err(|e| HistoryError::Hash {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(ContentHash::from_bytes(&content))
    }

    /// Fingerprints a tree whose every root must exist.
    pub fn fingerprint(tree: &FileTree) -> Result<FileCollectionFingerprint, HistoryError> {
        Self::fingerprint_named(&tree.display_name(), tree, false)
    }

    /// Fingerprints a tree, treating missing roots and files as empty.
    pub fn fingerprint_present(tree: &FileTree) -> Result<FileCollectionFingerprint, HistoryError> {
        Self::fingerprint_named(&tree.display_name(), tree, true)
    }

    /// Fingerprints every input property. All roots must exist.
    pub fn fingerprint_properties(
        properties: &BTreeMap<String, FileTree>,
    ) -> Result<PropertyFingerprints, HistoryError> {
        properties
            .iter()
            .map(|(name, tree)| -> Result<_, HistoryError> {
                let fingerprint = Self::fingerprint_named(name, tree, false)?;
                Ok((name.clone(), fingerprint))
            })
            .collect()
    }

    /// Fingerprints every output property. Outputs that have not been
    /// produced yet fingerprint as empty.
    pub fn fingerprint_outputs(
        properties: &BTreeMap<String, FileTree>,
    ) -> Result<PropertyFingerprints, HistoryError> {
        properties
            .iter()
            .map(|(name, tree)| -> Result<_, HistoryError> {
                let fingerprint = Self::fingerprint_named(name, tree, true)?;
                Ok((name.clone(), fingerprint))
            })
            .collect()
    }

    /// Hashes every scalar input value.
    pub fn hash_values(values: &BTreeMap<String, String>) -> BTreeMap<String, ContentHash> {
        values
            .iter()
            .map(|(name, value)| (name.clone(), ContentHash::from_str_value(value)))
            .collect()
    }

    fn fingerprint_named(
        property: &str,
        tree: &FileTree,
        present_only: bool,
    ) -> Result<FileCollectionFingerprint, HistoryError> {
        let mut collector = EntryCollector(Vec::new());
        let visited = if present_only {
            tree.visit_present(&mut collector)
        } else {
            tree.visit(&mut collector)
        };
        visited.map_err(|source| HistoryError::Resolve {
            property: property.to_string(),
            source,
        })?;

        let hashed: Vec<(String, ContentHash)> = collector
            .0
            .par_iter()
            .map(|entry| -> Result<(String, ContentHash), HistoryError> {
                let hash = if entry.is_dir() {
                    ContentHash::DIRECTORY
                } else {
                    Self::hash_file(entry.path())?
                };
                Ok((entry.relative_path().to_string(), hash))
            })
            .collect::<Result<_, _>>()?;

        Ok(hashed.into_iter().collect())
    }
}

struct EntryCollector(Vec<FileEntry>);

impl FileVisitor for EntryCollector {
    fn visit_dir(&mut self, entry: &FileEntry) {
        self.0.push(entry.clone());
    }

    fn visit_file(&mut self, entry: &FileEntry) {
        self.0.push(entry.clone());
    }
}
