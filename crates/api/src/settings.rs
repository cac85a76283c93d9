//! Service Configuration
//!
//! Loaded from an optional TOML file (`terra.toml`, or the path in
//! `TERRA_CONFIG`) and then from `TERRA__SECTION__KEY` environment variables.

use config::{Config, ConfigError, Environment, File};
use data_validator::ValidationConfig;
use feature_engine::SensorSnapshot;
use serde::Deserialize;
use std::path::PathBuf;
use storage::FirestoreConfig;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TerraConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
    pub validation: ValidationConfig,
}

impl TerraConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("TERRA_CONFIG").unwrap_or_else(|_| "terra.toml".to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("TERRA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub addr: String,
    /// Expose Prometheus metrics on `/metrics`
    pub metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            metrics: true,
        }
    }
}

/// Snapshot store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Firestore,
    Memory,
}

/// Snapshot store settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub firestore: FirestoreConfig,
    /// Initial reading for the memory backend
    pub seed: Option<SensorSnapshot>,
}

/// Model bundle settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path of the bundle manifest
    pub manifest_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from("models/terra_model.json"),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TerraConfig::default();
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.store.backend, StoreBackend::Firestore);
        assert_eq!(config.store.firestore.collection, "sensor_data");
        assert_eq!(config.store.firestore.document, "latest");
        assert_eq!(config.validation.target_yield_min, 1.0);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = TerraConfig::load_from("/nonexistent/terra-config.toml").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(
            config.model.manifest_path,
            PathBuf::from("models/terra_model.json")
        );
    }

    #[test]
    fn test_load_toml_file() {
        let path = std::env::temp_dir().join(format!("terra-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
addr = "127.0.0.1:9000"

[store]
backend = "memory"

[store.seed]
N = 12
pH = 6.2

[store.firestore]
project_id = "terra-cmu"

[logging]
json = true
"#
        )
        .unwrap();
        drop(file);

        let config = TerraConfig::load_from(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.server.addr, "127.0.0.1:9000");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.firestore.project_id, "terra-cmu");
        assert_eq!(config.store.firestore.collection, "sensor_data");
        let seed = config.store.seed.unwrap();
        assert_eq!(seed.nitrogen(), 12.0);
        assert_eq!(seed.ph(), 6.2);
        assert_eq!(seed.k, None);
        assert!(config.logging.json);
    }
}
