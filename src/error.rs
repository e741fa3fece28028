//! Error types for the ontology to OpenAPI converter

use std::path::PathBuf;
use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Conversion errors
///
/// Only loading and serialization are fatal. Missing annotations, dangling
/// references and malformed literals degrade to defaults inside the engine
/// and never surface here.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Failed to load graph from {path}: {message}")]
    Load { path: String, message: String },

    #[error("Unsupported graph format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl ConvertError {
    /// Build a load error for an in-memory or on-disk source
    pub fn load(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ConvertError::Load {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
