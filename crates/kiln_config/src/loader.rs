//! Reading `kiln.toml` and checking its declarations.

use crate::error::ConfigError;
use crate::types::{FileSpec, KilnConfig};
use std::path::Path;

/// Name of the configuration file within a project directory.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Loads and validates a `kiln.toml` configuration from a project directory.
///
/// Reads `<project_dir>/kiln.toml`, parses it, and validates it.
pub fn load_config(project_dir: &Path) -> Result<KilnConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `kiln.toml` configuration from a string.
///
/// The same checks as [`load_config`] apply.
pub fn load_config_from_str(content: &str) -> Result<KilnConfig, ConfigError> {
    let config: KilnConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates declarations so that mistakes surface before any work is resolved.
fn validate_config(config: &KilnConfig) -> Result<(), ConfigError> {
    if config.execution.max_change_messages == 0 {
        return Err(ConfigError::ValidationError(
            "execution.max_change_messages must be at least 1".to_string(),
        ));
    }
    if config.history.dir.trim().is_empty() {
        return Err(ConfigError::MissingField("history.dir".to_string()));
    }

    for (name, work) in &config.work {
        if name.trim().is_empty() {
            return Err(ConfigError::MissingField("work.<name>".to_string()));
        }
        if work.outputs.is_empty() {
            return Err(ConfigError::MissingField(format!("work.{name}.outputs")));
        }
        for (property, spec) in &work.inputs {
            validate_file_spec(&format!("work.{name}.inputs.{property}"), spec)?;
        }
        for (property, spec) in &work.outputs {
            validate_file_spec(&format!("work.{name}.outputs.{property}"), spec)?;
        }
        for dependency in &work.depends_on {
            if dependency == name {
                return Err(ConfigError::ValidationError(format!(
                    "work.{name} cannot depend on itself"
                )));
            }
            if !config.work.contains_key(dependency) {
                return Err(ConfigError::UnknownWork(dependency.clone()));
            }
        }
    }
    Ok(())
}

fn validate_file_spec(location: &str, spec: &FileSpec) -> Result<(), ConfigError> {
    match (&spec.dir, spec.files.is_empty()) {
        (Some(_), true) | (None, false) => {}
        _ => {
            return Err(ConfigError::ValidationError(format!(
                "{location} must declare exactly one of 'dir' or 'files'"
            )))
        }
    }
    for pattern in spec.include.iter().chain(&spec.exclude) {
        glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            location: location.to_string(),
            pattern: pattern.clone(),
            reason: e.msg.to_string(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert!(config.execution.change_tracking);
        assert_eq!(config.history.dir, ".kiln/history");
        assert!(config.work.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[execution]
change_tracking = false
max_change_messages = 5

[history]
dir = "build/history"

[diagnostics]
level = "debug"

[work.generate]
outputs.sources = { dir = "build/generated" }

[work.compile]
display_name = "task ':compile'"
depends_on = ["generate"]
values = { target = "release" }

[work.compile.inputs.sources]
dir = "src"
include = ["**/*.rs"]
exclude = "**/scratch/**"

[work.compile.inputs.manifest]
files = ["Cargo.toml"]

[work.compile.outputs.binary]
files = ["app"]
base = "build/bin"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert!(!config.execution.change_tracking);
        assert_eq!(config.execution.max_change_messages, 5);
        assert_eq!(config.history.dir, "build/history");
        assert_eq!(config.diagnostics.level, kiln_diagnostics::Severity::Debug);

        let compile = &config.work["compile"];
        assert_eq!(compile.display_name.as_deref(), Some("task ':compile'"));
        assert_eq!(compile.depends_on, vec!["generate"]);
        assert_eq!(compile.values["target"], "release");
        assert_eq!(compile.inputs["sources"].dir.as_deref(), Some("src"));
        assert_eq!(compile.inputs["sources"].exclude, vec!["**/scratch/**"]);
        assert_eq!(compile.inputs["manifest"].files, vec!["Cargo.toml"]);
        assert_eq!(compile.outputs["binary"].base.as_deref(), Some("build/bin"));
    }

    #[test]
    fn work_without_outputs_errors() {
        let toml = r#"
[work.lint.inputs.sources]
dir = "src"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        match err {
            ConfigError::MissingField(field) => assert_eq!(field, "work.lint.outputs"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn file_set_with_dir_and_files_errors() {
        let toml = r#"
[work.copy.outputs.out]
dir = "out"
files = ["a.txt"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn file_set_with_neither_dir_nor_files_errors() {
        let toml = r#"
[work.copy.outputs.out]
include = ["*.txt"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_pattern_is_reported_with_location() {
        let toml = r#"
[work.copy.inputs.src]
dir = "src"
include = ["[a-"]

[work.copy.outputs.out]
dir = "out"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        match err {
            ConfigError::InvalidPattern {
                location, pattern, ..
            } => {
                assert_eq!(location, "work.copy.inputs.src");
                assert_eq!(pattern, "[a-");
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn unknown_dependency_errors() {
        let toml = r#"
[work.copy]
depends_on = ["missing"]
outputs.out = { dir = "out" }
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownWork(name) if name == "missing"));
    }

    #[test]
    fn self_dependency_errors() {
        let toml = r#"
[work.copy]
depends_on = ["copy"]
outputs.out = { dir = "out" }
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_change_messages_errors() {
        let toml = r#"
[execution]
max_change_messages = 0
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn unknown_level_is_parse_error() {
        let toml = r#"
[diagnostics]
level = "chatty"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn garbage_is_parse_error() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[work.copy.outputs.out]\ndir = \"out\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert!(config.work.contains_key("copy"));
    }

    #[test]
    fn missing_project_dir_is_io_error() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
