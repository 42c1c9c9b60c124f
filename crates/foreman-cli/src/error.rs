//! Error types for foreman-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from foreman-core
    #[error(transparent)]
    Core(#[from] foreman_core::Error),

    /// Error from foreman-api
    #[error(transparent)]
    Api(#[from] foreman_api::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed JSON arguments
    #[error("Invalid JSON arguments: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed configuration file
    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
