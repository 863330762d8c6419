//! Configuration management for the converter
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (avro2jsonschema.toml)
//! - Environment variables (AVRO2JSONSCHEMA_*)
//!
//! ## Example config file (avro2jsonschema.toml):
//! ```toml
//! [input]
//! extension = "avsc"
//! recursive = true
//!
//! [output]
//! extension = "schema.json"
//! format = "pretty"
//! checksums = false
//!
//! [validation]
//! strict_avro = true
//! verify_json_schema = false
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main configuration for the converter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Input discovery settings
    #[serde(default)]
    pub input: InputConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Input discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// File extension of Avro schema sources
    #[serde(default = "default_source_extension")]
    pub extension: String,

    /// Descend into subdirectories when the input is a directory
    #[serde(default = "default_true")]
    pub recursive: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// File extension of generated JSON Schema documents
    #[serde(default = "default_target_extension")]
    pub extension: String,

    /// Output format (pretty or compact)
    #[serde(default = "default_output_format")]
    pub format: OutputFormat,

    /// Write a checksums file next to the generated documents
    #[serde(default)]
    pub checksums: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Validate sources with the reference Avro parser before converting
    #[serde(default = "default_true")]
    pub strict_avro: bool,

    /// Compile every generated document against draft-07
    #[serde(default)]
    pub verify_json_schema: bool,
}

// Default value functions
fn default_source_extension() -> String {
    "avsc".to_string()
}

fn default_target_extension() -> String {
    "schema.json".to_string()
}

fn default_true() -> bool {
    true
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extension: default_source_extension(),
            recursive: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: default_target_extension(),
            format: OutputFormat::Pretty,
            checksums: false,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict_avro: true,
            verify_json_schema: false,
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            output: OutputConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl ConvertConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = [
            "avro2jsonschema.toml",
            ".avro2jsonschema.toml",
            "config/avro2jsonschema.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) =
            directories::ProjectDirs::from("dev", "avro2jsonschema", "avro2jsonschema")
        {
            let xdg_config = config_dir.config_dir().join("avro2jsonschema.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (AVRO2JSONSCHEMA_*)
        builder = builder.add_source(
            Environment::with_prefix("AVRO2JSONSCHEMA")
                .separator("__")
                .try_parsing(true),
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
}
