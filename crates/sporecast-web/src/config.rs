//! YAML configuration for the server and CLI.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration:
//!
//! ```yaml
//! listen_addr: "127.0.0.1:8501"
//! artifacts:
//!   dir: artifacts
//!   classifier: logistic_model.json
//!   scaler: scaler.json
//!   columns: feature_columns.json
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sporecast::persist::{
    DEFAULT_ARTIFACT_DIR, DEFAULT_CLASSIFIER_FILE, DEFAULT_COLUMNS_FILE, DEFAULT_SCALER_FILE,
};
use sporecast::ArtifactPaths;
use tracing::info;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SPORECAST_CONFIG";

/// Default listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8501";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Artifact file locations.
    pub artifacts: ArtifactsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            artifacts: ArtifactsConfig::default(),
        }
    }
}

/// Artifact file locations. Relative file names resolve against `dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub dir: PathBuf,
    pub classifier: PathBuf,
    pub scaler: PathBuf,
    pub columns: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            classifier: PathBuf::from(DEFAULT_CLASSIFIER_FILE),
            scaler: PathBuf::from(DEFAULT_SCALER_FILE),
            columns: PathBuf::from(DEFAULT_COLUMNS_FILE),
        }
    }
}

impl ArtifactsConfig {
    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths::builder()
            .dir(self.dir.clone())
            .classifier(self.classifier.clone())
            .scaler(self.scaler.clone())
            .columns(self.columns.clone())
            .build()
    }
}

/// Load an [`AppConfig`] from a YAML file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the YAML is invalid.
pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
    // An empty document parses as null, not as an empty mapping.
    if contents.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let config: AppConfig = serde_yaml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config YAML {}: {}", path.display(), e))?;
    Ok(config)
}

/// Pick the config file: the explicit path first, then the environment.
pub fn config_path(explicit: Option<PathBuf>, env: Option<OsString>) -> Option<PathBuf> {
    explicit.or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
}

/// Resolve and load the configuration, falling back to defaults.
///
/// Checks (in order):
/// 1. `explicit` (the `--config` flag)
/// 2. the `SPORECAST_CONFIG` environment variable
/// 3. the default configuration
pub fn resolve_config(explicit: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    match config_path(explicit, std::env::var_os(CONFIG_ENV)) {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration from file");
            load_config(&path)
        }
        None => {
            info!("No config file specified, using defaults");
            Ok(AppConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper to write YAML to a temp file and return the path.
    fn write_yaml(yaml: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(yaml.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_load_config_full() {
        let yaml = r#"
listen_addr: "0.0.0.0:9000"
artifacts:
  dir: /srv/models
  classifier: model.bin
  scaler: scaler.bin
  columns: /etc/sporecast/columns.json
"#;
        let f = write_yaml(yaml);
        let config = load_config(f.path()).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:9000");

        let paths = config.artifacts.paths();
        assert_eq!(paths.classifier_path(), PathBuf::from("/srv/models/model.bin"));
        assert_eq!(paths.columns_path(), PathBuf::from("/etc/sporecast/columns.json"));
    }

    #[test]
    fn test_load_config_partial_uses_defaults() {
        let f = write_yaml("artifacts:\n  dir: models\n");
        let config = load_config(f.path()).unwrap();
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(
            config.artifacts.paths().scaler_path(),
            PathBuf::from("models/scaler.json")
        );
    }

    #[test]
    fn test_load_config_empty_file() {
        let f = write_yaml("");
        assert_eq!(load_config(f.path()).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Path::new("/nonexistent/sporecast.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_yaml() {
        let f = write_yaml("not: [valid: yaml: {{{}}}");
        assert!(load_config(f.path()).is_err());
    }

    #[test]
    fn test_config_path_precedence() {
        let flag = Some(PathBuf::from("flag.yaml"));
        let env = Some(OsString::from("env.yaml"));
        assert_eq!(config_path(flag.clone(), env.clone()), flag);
        assert_eq!(config_path(None, env), Some(PathBuf::from("env.yaml")));
        assert_eq!(config_path(None, Some(OsString::new())), None);
        assert_eq!(config_path(None, None), None);
    }
}
