//! Configuration management for the validator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (jsonld.toml)
//! - Environment variables (JSONLD__*)
//!
//! ## Example config file (jsonld.toml):
//! ```toml
//! [fetch]
//! timeout_secs = 10
//! user_agent = "jsonld-validator/0.1"
//!
//! [output]
//! format = "pretty"
//! show_violations = true
//!
//! [validation]
//! closed_shapes = ["FAQPage"]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::registry::{ShapeRegistry, DEFAULT_CLOSED_SHAPES};

/// Main configuration for the validator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Page retrieval settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Reporting settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Shape policy
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with the request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON layout for `--format json`
    #[serde(default)]
    pub format: OutputFormat,

    /// Print each violation under a failing script
    #[serde(default)]
    pub show_violations: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Shapes that reject undeclared top-level keys
    #[serde(default = "default_closed_shapes")]
    pub closed_shapes: Vec<String>,
}

// Default value functions
fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("jsonld-validator/{}", env!("CARGO_PKG_VERSION"))
}

fn default_closed_shapes() -> Vec<String> {
    DEFAULT_CLOSED_SHAPES.iter().map(|s| s.to_string()).collect()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            closed_shapes: default_closed_shapes(),
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["jsonld.toml", ".jsonld.toml", "config/jsonld.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "jsonld", "jsonld-validator") {
            let xdg_config = config_dir.config_dir().join("jsonld.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Environment variables (JSONLD__FETCH__TIMEOUT_SECS=5)
        builder = builder.add_source(
            Environment::with_prefix("JSONLD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("validation.closed_shapes"),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Registry honoring the configured shape policy
    ///
    /// `closed_shapes` may name a shape or any `@type` alias of it; a name that
    /// matches neither is an error.
    pub fn registry(&self) -> crate::error::Result<ShapeRegistry> {
        ShapeRegistry::try_with_closed(&self.validation.closed_shapes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidatorConfig::default();
        assert_eq!(config.fetch.timeout_secs, 10);
        assert_eq!(config.validation.closed_shapes, vec!["FAQPage".to_string()]);
        assert_eq!(config.output.format, OutputFormat::Pretty);
        assert!(!config.output.show_violations);
    }

    #[test]
    fn test_serialize_config() {
        let config = ValidatorConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[fetch]"));
        assert!(toml_str.contains("[validation]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[fetch]\ntimeout_secs = 3\n\n[validation]\nclosed_shapes = []\n",
        )
        .unwrap();

        let config = ValidatorConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.fetch.timeout_secs, 3);
        assert!(config.validation.closed_shapes.is_empty());
        assert!(config.registry().unwrap().resolve("FAQPage").unwrap().open);
    }

    #[test]
    fn test_closed_shapes_accept_aliases() {
        let mut config = ValidatorConfig::default();
        config.validation.closed_shapes = vec!["BlogPosting".to_string()];
        let registry = config.registry().unwrap();
        assert!(!registry.resolve("Article").unwrap().open);
        assert!(!registry.resolve("NewsArticle").unwrap().open);
        assert!(registry.resolve("FAQPage").unwrap().open);
    }

    #[test]
    fn test_closed_shapes_reject_unknown_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.toml");
        std::fs::write(&path, "[validation]\nclosed_shapes = [\"FAQPage\", \"Artcle\"]\n").unwrap();

        let config = ValidatorConfig::load_from(path.to_str()).unwrap();
        match config.registry() {
            Err(crate::error::SchemaError::UnknownType(name)) => assert_eq!(name, "Artcle"),
            other => panic!("Expected UnknownType, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = ValidatorConfig::default();
        config.output.show_violations = true;
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = ValidatorConfig::load_from(path.to_str()).unwrap();
        assert!(loaded.output.show_violations);
    }
}
