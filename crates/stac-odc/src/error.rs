//! Error types for the STAC → ODC transform.

use thiserror::Error;

/// Errors that can occur while canonicalizing a STAC item.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Default grid '{key}' matches no asset (available grids: {available:?})")]
    UnknownDefaultGrid { key: String, available: Vec<String> },

    #[error("Invalid value for '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

impl TransformError {
    /// Build a [`TransformError::MissingField`].
    pub fn missing(field: impl Into<String>) -> Self {
        TransformError::MissingField(field.into())
    }

    /// Build a [`TransformError::InvalidField`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        TransformError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;
