//! Error types for the diff engine
//!
//! The comparison and validation functions never fail; these errors cover the
//! I/O and configuration edges around them.

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}
