//! Topic catalog loading.

use std::fs;
use std::path::Path;

use interview_models::{builtin_registry, TopicRegistry};
use tracing::info;

use crate::error::{ConfigError, Result};
use crate::settings::InterviewConfig;

/// Load a YAML topic catalog file.
pub fn load_catalog(path: &Path) -> Result<TopicRegistry> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let registry = TopicRegistry::from_yaml_str(&text)?;
    info!(path = %path.display(), topics = registry.len(), "Loaded topic catalog");
    Ok(registry)
}

/// The configured catalog, or the built-in one when none is configured.
///
/// Relative catalog paths resolve against `config_dir`.
pub fn load_registry(config: &InterviewConfig, config_dir: &Path) -> Result<TopicRegistry> {
    match config.catalog_path(config_dir) {
        Some(path) => load_catalog(&path),
        None => Ok(builtin_registry()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CATALOG: &str = r#"
topics:
  - key: scheduling
    label: Scheduling
    requirement_groups:
      - [shift, rotation]
      - [weekend, holiday]
    critical_questions:
      - how are weekend shifts assigned
  - key: equipment
    label: Equipment
    requirement_groups:
      - [truck, vehicle]
"#;

    #[test]
    fn test_builtin_when_unconfigured() {
        let dir = tempdir().unwrap();
        let registry = load_registry(&InterviewConfig::default(), dir.path()).unwrap();
        assert_eq!(registry.len(), 9);
    }

    #[test]
    fn test_relative_catalog_path() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("topics.yaml"), CATALOG).unwrap();
        let config = InterviewConfig {
            topic_catalog: Some("topics.yaml".into()),
            ..InterviewConfig::default()
        };

        let registry = load_registry(&config, dir.path()).unwrap();
        let keys: Vec<&str> = registry.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["scheduling", "equipment"]);
        assert_eq!(registry.get_str("scheduling").unwrap().critical_questions.len(), 1);
    }

    #[test]
    fn test_missing_and_invalid_catalogs() {
        let dir = tempdir().unwrap();
        let err = load_catalog(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));

        let dup = dir.path().join("dup.yaml");
        fs::write(&dup, "topics:\n  - {key: a, label: A, requirement_groups: [[x]]}\n  - {key: a, label: B, requirement_groups: [[y]]}\n").unwrap();
        assert!(matches!(load_catalog(&dup).unwrap_err(), ConfigError::Catalog(_)));
    }
}
