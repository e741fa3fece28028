//! Configuration management for the converter
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (onto-openapi.toml)
//! - Environment variables (ONTO_OPENAPI__*)
//!
//! ## Example config file (onto-openapi.toml):
//! ```toml
//! [conversion]
//! convention = "auto"
//! inline_references = true
//!
//! [document]
//! openapi_version = "3.0.3"
//! default_title = "Generated API"
//! default_version = "1.0.0"
//! success_description = "Successful response"
//! error_description = "Error response"
//! content_type = "application/json"
//!
//! [output]
//! format = "pretty"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Main configuration for a conversion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// How schemas are reconstructed
    #[serde(default)]
    pub conversion: ConversionConfig,

    /// Defaults written into the generated document
    #[serde(default)]
    pub document: DocumentConfig,

    /// Rendering settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which annotation vocabulary drives a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConventionChoice {
    /// Pick by looking at the predicates present in the graph
    #[default]
    Auto,
    /// Comma-separated field lists, forward direction
    Coarse,
    /// Per-property predicates, full round-trip
    Fine,
}

impl std::str::FromStr for ConventionChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "coarse" => Ok(Self::Coarse),
            "fine" => Ok(Self::Fine),
            other => Err(format!("unknown convention '{}' (expected auto, coarse or fine)", other)),
        }
    }
}

/// Conversion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Annotation convention
    #[serde(default)]
    pub convention: ConventionChoice,

    /// Run the inlining post-pass for the coarse convention
    #[serde(default = "default_true")]
    pub inline_references: bool,
}

/// Document defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    #[serde(default = "default_openapi_version")]
    pub openapi_version: String,

    /// Title used when the graph carries no `apiTitle`
    #[serde(default = "default_title")]
    pub default_title: String,

    /// Version used when the graph carries no `apiVersion`
    #[serde(default = "default_version")]
    pub default_version: String,

    #[serde(default = "default_success_description")]
    pub success_description: String,

    #[serde(default = "default_error_description")]
    pub error_description: String,

    /// Media type for request and response bodies
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_openapi_version() -> String {
    "3.0.3".to_string()
}

fn default_title() -> String {
    "Generated API".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_success_description() -> String {
    "Successful response".to_string()
}

fn default_error_description() -> String {
    "Error response".to_string()
}

fn default_content_type() -> String {
    "application/json".to_string()
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            convention: ConventionChoice::Auto,
            inline_references: true,
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            openapi_version: default_openapi_version(),
            default_title: default_title(),
            default_version: default_version(),
            success_description: default_success_description(),
            error_description: default_error_description(),
            content_type: default_content_type(),
        }
    }
}

impl ConverterConfig {
    /// Load configuration, layering an explicit file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "onto-openapi.toml",
            ".onto-openapi.toml",
            "config/onto-openapi.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "onto-openapi") {
            let xdg_config = config_dir.config_dir().join("onto-openapi.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // ONTO_OPENAPI__DOCUMENT__DEFAULT_TITLE=...
        builder = builder.add_source(
            Environment::with_prefix("ONTO_OPENAPI")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
