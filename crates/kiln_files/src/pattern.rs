//! Include/exclude glob pattern sets.

use glob::{MatchOptions, Pattern};

use crate::error::FileTreeError;

/// `*` stays within one path component; `**` spans directories.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A set of include and exclude patterns evaluated against root-relative paths.
///
/// An entry is admitted when no include patterns are present or at least one
/// matches, and no exclude pattern matches. Patterns are compiled when added,
/// so syntax errors surface while the tree is being composed.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    includes: Vec<Pattern>,
    excludes: Vec<ExcludePattern>,
}

#[derive(Debug, Clone)]
struct ExcludePattern {
    pattern: Pattern,
    /// For `dir/**`, the pattern matching `dir` itself, which prunes the walk.
    prefix: Option<Pattern>,
}

impl PatternSet {
    /// Creates an empty pattern set that admits everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an include pattern.
    pub fn include(mut self, pattern: &str) -> Result<Self, FileTreeError> {
        self.includes.push(compile(pattern)?);
        Ok(self)
    }

    /// Adds an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self, FileTreeError> {
        let prefix = match pattern.strip_suffix("/**") {
            Some(dir) if !dir.is_empty() => Some(compile(dir)?),
            _ => None,
        };
        self.excludes.push(ExcludePattern {
            pattern: compile(pattern)?,
            prefix,
        });
        Ok(self)
    }

    /// Adds every pattern in `patterns` as an include.
    pub fn include_all<I, S>(self, patterns: I) -> Result<Self, FileTreeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        patterns
            .into_iter()
            .try_fold(self, |set, p| set.include(p.as_ref()))
    }

    /// Adds every pattern in `patterns` as an exclude.
    pub fn exclude_all<I, S>(self, patterns: I) -> Result<Self, FileTreeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        patterns
            .into_iter()
            .try_fold(self, |set, p| set.exclude(p.as_ref()))
    }

    /// Returns `true` if the set has neither includes nor excludes.
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    /// Returns `true` if an entry at `relative_path` is admitted.
    pub fn matches(&self, relative_path: &str) -> bool {
        let included = self.includes.is_empty()
            || self
                .includes
                .iter()
                .any(|p| p.matches_with(relative_path, MATCH_OPTIONS));
        included && !self.is_excluded(relative_path)
    }

    /// Returns `true` if an exclude pattern matches `relative_path`.
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.excludes
            .iter()
            .any(|e| e.pattern.matches_with(relative_path, MATCH_OPTIONS))
    }

    /// Returns `true` if the directory at `relative_path` and everything below
    /// it is excluded, so the walk need not descend into it.
    pub fn prunes_dir(&self, relative_path: &str) -> bool {
        self.excludes.iter().any(|e| {
            e.pattern.matches_with(relative_path, MATCH_OPTIONS)
                || e.prefix
                    .as_ref()
                    .is_some_and(|p| p.matches_with(relative_path, MATCH_OPTIONS))
        })
    }
}

fn compile(pattern: &str) -> Result<Pattern, FileTreeError> {
    Pattern::new(pattern).map_err(|e| FileTreeError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.msg.to_string(),
    })
}
