//! Configuration types deserialized from `kiln.toml`.

use kiln_diagnostics::Severity;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// The top-level configuration parsed from `kiln.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct KilnConfig {
    /// Change tracking settings.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Where execution history is kept.
    #[serde(default)]
    pub history: HistoryConfig,
    /// Diagnostic threshold.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// Declared units of work, keyed by name.
    #[serde(default)]
    pub work: BTreeMap<String, WorkConfig>,
}

/// Settings for the up-to-date decision.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    /// When `false`, change detection is skipped and every unit of work executes.
    #[serde(default = "default_change_tracking")]
    pub change_tracking: bool,
    /// Maximum number of change reasons reported per unit of work.
    #[serde(default = "default_max_change_messages")]
    pub max_change_messages: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            change_tracking: default_change_tracking(),
            max_change_messages: default_max_change_messages(),
        }
    }
}

fn default_change_tracking() -> bool {
    true
}

fn default_max_change_messages() -> usize {
    3
}

/// Location of the execution history store.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// History directory, relative to the project directory.
    #[serde(default = "default_history_dir")]
    pub dir: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: default_history_dir(),
        }
    }
}

fn default_history_dir() -> String {
    ".kiln/history".to_string()
}

/// Diagnostic settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    /// Minimum severity that is kept and reported.
    #[serde(default = "default_level")]
    pub level: Severity,
    /// How many diagnostics the engine's sink holds before dropping the
    /// oldest. Zero keeps everything.
    #[serde(default = "default_retain")]
    pub retain: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            retain: default_retain(),
        }
    }
}

fn default_level() -> Severity {
    Severity::Info
}

fn default_retain() -> usize {
    1024
}

/// Declaration of one unit of work.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkConfig {
    /// Human-readable name used in diagnostics (defaults to `task '<key>'`).
    pub display_name: Option<String>,
    /// Input file properties, keyed by property name.
    #[serde(default)]
    pub inputs: BTreeMap<String, FileSpec>,
    /// Output file properties, keyed by property name.
    #[serde(default)]
    pub outputs: BTreeMap<String, FileSpec>,
    /// Scalar input properties, keyed by property name.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    /// Units of work that produce files this one consumes.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

/// A declared file property: either a directory tree or an explicit file list.
///
/// Exactly one of `dir` and `files` must be given. `include` and `exclude`
/// accept a single pattern or a list, matched relative to `dir` (or `base`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileSpec {
    /// Root directory of a directory tree.
    pub dir: Option<String>,
    /// Explicit files, relative to `base`.
    #[serde(default)]
    pub files: Vec<String>,
    /// Base directory for `files` (defaults to the project directory).
    pub base: Option<String>,
    /// Patterns a file must match to be included.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub include: Vec<String>,
    /// Patterns that exclude a file or directory.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub exclude: Vec<String>,
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `include = "**/*.rs"` as well as `include = ["**/*.rs", "*.toml"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_defaults() {
        let exec = ExecutionConfig::default();
        assert!(exec.change_tracking);
        assert_eq!(exec.max_change_messages, 3);
    }

    #[test]
    fn history_default_dir() {
        assert_eq!(HistoryConfig::default().dir, ".kiln/history");
    }

    #[test]
    fn include_accepts_single_string() {
        let spec: FileSpec = toml::from_str(
            r#"
dir = "src"
include = "**/*.rs"
"#,
        )
        .unwrap();
        assert_eq!(spec.include, vec!["**/*.rs"]);
        assert!(spec.exclude.is_empty());
    }

    #[test]
    fn include_accepts_list() {
        let spec: FileSpec = toml::from_str(
            r#"
dir = "src"
include = ["*.txt", "*.md"]
exclude = ["draft-*"]
"#,
        )
        .unwrap();
        assert_eq!(spec.include, vec!["*.txt", "*.md"]);
        assert_eq!(spec.exclude, vec!["draft-*"]);
    }

    #[test]
    fn diagnostics_level_parses_lowercase() {
        let diag: DiagnosticsConfig = toml::from_str(r#"level = "debug""#).unwrap();
        assert_eq!(diag.level, Severity::Debug);
        assert_eq!(diag.retain, 1024);
    }

    #[test]
    fn work_config_defaults() {
        let work: WorkConfig = toml::from_str("").unwrap();
        assert!(work.display_name.is_none());
        assert!(work.inputs.is_empty());
        assert!(work.outputs.is_empty());
        assert!(work.values.is_empty());
        assert!(work.depends_on.is_empty());
    }
}
