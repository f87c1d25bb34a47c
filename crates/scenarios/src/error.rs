//! Error types for scenario resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using ScenarioError.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Unknown scenario '{name}' (available: {available})")]
    NotFound { name: String, available: String },

    #[error("Failed to read scenario file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse scenario file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid scenario: {0}")]
    Invalid(String),
}
