//! Error types for startstop
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while configuring or running a loop service
#[derive(Debug, Error)]
pub enum StartStopError {
    /// Configuration rejected as a whole
    #[error("Config error: {0}")]
    Config(String),

    /// Required attribute absent from the resource config
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    /// Attribute present but of the wrong type
    #[error("Invalid attribute {name}: expected {expected}")]
    InvalidAttribute { name: String, expected: &'static str },

    /// Required dependency absent or of the wrong capability
    #[error("Dependency error: {0}")]
    Dependency(String),

    /// Actuator call failed
    #[error("Actuator error: {0}")]
    Actuator(String),

    /// Execution context could not be created or driven
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl StartStopError {
    /// True for errors raised while validating config or dependencies
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            StartStopError::Config(_)
                | StartStopError::MissingAttribute(_)
                | StartStopError::InvalidAttribute { .. }
                | StartStopError::Dependency(_)
        )
    }
}

/// Result type alias for startstop operations
pub type Result<T> = std::result::Result<T, StartStopError>;
