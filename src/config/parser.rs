use std::path::{Path, PathBuf};

use tracing::warn;

use crate::errors::AutobumpError;

use super::schema::CONFIG_SCHEMA;
use super::types::Config;

/// Default config file name, searched in the working directory and $HOME.
pub const CONFIG_FILE: &str = ".autobump.yaml";

pub async fn parse_config(path: &Path) -> Result<Config, AutobumpError> {
    if !path.exists() {
        return Err(AutobumpError::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(AutobumpError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let yaml: serde_yaml::Value = serde_yaml::from_str(&content)?;

    // JSON Schema validation
    validate_schema(&yaml)?;

    // Parse into typed config
    let config: Config = serde_yaml::from_value(yaml)?;

    // Semantic validation
    validate_values(&config)?;

    Ok(config)
}

/// Locate the config file next to the run or in the home directory; None
/// when neither exists.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    let home = std::env::var_os("HOME")?;
    let in_home = PathBuf::from(home).join(CONFIG_FILE);
    in_home.exists().then_some(in_home)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), AutobumpError> {
    // Convert YAML value to JSON for schema validation
    let json_value: serde_json::Value = serde_json::to_value(yaml)
        .map_err(|e| AutobumpError::Config(format!("Config conversion error: {e}")))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| AutobumpError::Config(format!("Schema compilation error: {e}")))?;

    if let Err(errors) = compiled.validate(&json_value) {
        // Warn but don't fail, schema validation is advisory
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

fn validate_values(config: &Config) -> Result<(), AutobumpError> {
    if !(0.0..=10.0).contains(&config.cvss_threshold) {
        return Err(AutobumpError::Config(format!(
            "cvss_threshold must be within 0.0..=10.0, got {}",
            config.cvss_threshold
        )));
    }
    if config.generate_vex && config.vex_output.is_empty() {
        return Err(AutobumpError::Config(
            "vex_output must be set when generate_vex is enabled".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let err = parse_config(Path::new("/nonexistent/.autobump.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, AutobumpError::Config(_)));
    }

    #[tokio::test]
    async fn test_parse_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        tokio::fs::write(
            &path,
            "cvss_threshold: 8.5\nallow_major: true\nexclude:\n  - testdata/*\n",
        )
        .await
        .unwrap();

        let config = parse_config(&path).await.unwrap();
        assert_eq!(config.cvss_threshold, 8.5);
        assert!(config.allow_major);
        assert_eq!(config.exclude, vec!["testdata/*"]);
        // Untouched fields keep their defaults
        assert_eq!(config.vex_output, ".vex.openvex.json");
        assert!(!config.skip_tidy);
    }

    #[tokio::test]
    async fn test_out_of_range_threshold_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        tokio::fs::write(&path, "cvss_threshold: 11.0\n").await.unwrap();
        let err = parse_config(&path).await.unwrap_err();
        assert!(matches!(err, AutobumpError::Config(_)));
    }
}
