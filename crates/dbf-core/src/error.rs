//! Error types for dbf-core

use thiserror::Error;

/// Core error type for dbframe
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Unknown connection target
    #[error("[C004] Unknown target '{name}'. Available targets: {available}")]
    UnknownTarget { name: String, available: String },

    /// C005: Invalid table or column identifier
    #[error("[C005] Invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// C006: IO error with file path context
    #[error("[C006] IO error at {path}: {source}")]
    IoWithPath {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ConfigParseError {
            message: err.to_string(),
        }
    }
}
