use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EtlError, Result};

/// Run configuration: where schemas live, where artifacts go, and which
/// file sources to process. Loaded from TOML; relative paths resolve
/// against the config file's directory so runs behave the same from any
/// working directory.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub schemas_dir: PathBuf,
    pub output_dir: PathBuf,
    pub quarantine_dir: PathBuf,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// One configured input: a CSV file validated against a named schema.
#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    pub schema_ref: String,
    pub path: PathBuf,
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path).map_err(|e| {
            EtlError::Config(format!(
                "failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new("."));
        config.schemas_dir = resolve(base, &config.schemas_dir);
        config.output_dir = resolve(base, &config.output_dir);
        config.quarantine_dir = resolve(base, &config.quarantine_dir);
        for source in &mut config.sources {
            source.path = resolve(base, &source.path);
        }
        Ok(config)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_resolves_relative_paths_against_config_dir() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("etl.toml");
        fs::write(
            &config_path,
            r#"
schemas_dir = "schemas"
output_dir = "out"
quarantine_dir = "quarantine"

[[sources]]
id = "tracker"
schema_ref = "kitchen_tracker"
path = "input/tracker.csv"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.schemas_dir, dir.path().join("schemas"));
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].path, dir.path().join("input/tracker.csv"));
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }
}
