//! Configuration management for the migration engine
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (migrate.toml)
//! - Environment variables (MIGRATE__*)
//!
//! ## Example config file (migrate.toml):
//! ```toml
//! [engine]
//! current_version = 2730
//! strict_catalog = true
//!
//! [io]
//! output_format = "pretty"
//!
//! [batch]
//! fail_fast = false
//! extensions = ["json"]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// DataVersion records are brought to when no target is given (1.17.1)
pub const DEFAULT_CURRENT_VERSION: u32 = 2730;

/// Main configuration for the migration engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrateConfig {
    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Input/output settings
    #[serde(default)]
    pub io: IoConfig,

    /// Batch migration settings
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Version records are migrated to by default
    #[serde(default = "default_current_version")]
    pub current_version: u32,

    /// Reject converters registered at undeclared checkpoints
    #[serde(default = "default_true")]
    pub strict_catalog: bool,
}

/// Input/output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoConfig {
    /// Output format (pretty or compact)
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    pub fn is_pretty(self) -> bool {
        self == OutputFormat::Pretty
    }
}

/// Batch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Abort the batch on the first record that fails to migrate
    #[serde(default)]
    pub fail_fast: bool,

    /// File extensions picked up when walking a directory
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_current_version() -> u32 {
    DEFAULT_CURRENT_VERSION
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["json".to_string()]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            current_version: DEFAULT_CURRENT_VERSION,
            strict_catalog: true,
        }
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Pretty,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            extensions: default_extensions(),
        }
    }
}

impl MigrateConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["migrate.toml", ".migrate.toml", "config/migrate.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "record-schemas", "migrate") {
            let xdg_config = config_dir.config_dir().join("migrate.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // MIGRATE__ENGINE__CURRENT_VERSION=2586
        builder = builder.add_source(
            Environment::with_prefix("MIGRATE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Whether an extension (without the dot) is picked up by batch runs
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.batch
            .extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MigrateConfig::default();
        assert_eq!(config.engine.current_version, 2730);
        assert!(config.engine.strict_catalog);
        assert!(config.io.output_format.is_pretty());
        assert!(config.accepts_extension("JSON"));
        assert!(!config.accepts_extension("dat"));
    }

    #[test]
    fn test_serialize_config() {
        let config = MigrateConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[engine]"));
        assert!(toml_str.contains("[batch]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[engine]\ncurrent_version = 1519\nstrict_catalog = false\n\n[io]\noutput_format = \"compact\"\n",
        )
        .unwrap();

        let config = MigrateConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.engine.current_version, 1519);
        assert!(!config.engine.strict_catalog);
        assert_eq!(config.io.output_format, OutputFormat::Compact);
        assert!(!config.batch.fail_fast);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = MigrateConfig::default();
        config.batch.fail_fast = true;
        config.save(&path).unwrap();

        let loaded = MigrateConfig::load_from(path.to_str()).unwrap();
        assert!(loaded.batch.fail_fast);
    }
}
