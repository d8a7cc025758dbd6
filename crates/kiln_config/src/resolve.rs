//! Work resolution: looking up a declared unit of work and filling in defaults.

use crate::error::ConfigError;
use crate::types::{FileSpec, KilnConfig};
use std::collections::BTreeMap;

/// A declared unit of work with defaults applied.
#[derive(Debug, Clone)]
pub struct ResolvedWork {
    /// The key the work was declared under.
    pub name: String,
    /// Display name, defaulting to `task '<name>'`.
    pub display_name: String,
    /// Input file properties.
    pub inputs: BTreeMap<String, FileSpec>,
    /// Output file properties.
    pub outputs: BTreeMap<String, FileSpec>,
    /// Scalar input properties.
    pub values: BTreeMap<String, String>,
    /// Names of producing units of work.
    pub depends_on: Vec<String>,
}

/// Resolves a named unit of work from the configuration.
pub fn resolve_work(config: &KilnConfig, name: &str) -> Result<ResolvedWork, ConfigError> {
    let work = config
        .work
        .get(name)
        .ok_or_else(|| ConfigError::UnknownWork(name.to_string()))?;

    Ok(ResolvedWork {
        name: name.to_string(),
        display_name: work
            .display_name
            .clone()
            .unwrap_or_else(|| format!("task '{name}'")),
        inputs: work.inputs.clone(),
        outputs: work.outputs.clone(),
        values: work.values.clone(),
        depends_on: work.depends_on.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    const CONFIG: &str = r#"
[work.generate]
outputs.sources = { dir = "gen" }

[work.compile]
display_name = "compiler"
depends_on = ["generate"]
inputs.sources = { dir = "src", include = "*.c" }
outputs.objects = { dir = "obj" }
"#;

    #[test]
    fn resolve_with_default_display_name() {
        let config = load_config_from_str(CONFIG).unwrap();
        let work = resolve_work(&config, "generate").unwrap();
        assert_eq!(work.name, "generate");
        assert_eq!(work.display_name, "task 'generate'");
        assert!(work.inputs.is_empty());
        assert_eq!(work.outputs.len(), 1);
    }

    #[test]
    fn resolve_with_explicit_display_name() {
        let config = load_config_from_str(CONFIG).unwrap();
        let work = resolve_work(&config, "compile").unwrap();
        assert_eq!(work.display_name, "compiler");
        assert_eq!(work.depends_on, vec!["generate"]);
        assert_eq!(work.inputs["sources"].include, vec!["*.c"]);
    }

    #[test]
    fn resolve_unknown_work_errors() {
        let config = load_config_from_str(CONFIG).unwrap();
        let err = resolve_work(&config, "link").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownWork(name) if name == "link"));
    }
}
