//! Error types for foreman-api

/// Result type for foreman-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the Foreman server
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    /// The request never got an answer (DNS, TLS, connection refused, ...)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the JSON we expected
    #[error("Invalid response: {0}")]
    Json(#[from] serde_json::Error),

    /// Connection settings cannot produce a usable base URL
    #[error("Invalid connection settings: {message}")]
    InvalidConnection { message: String },

    /// A nested resource was addressed without its parent identifiers
    #[error("{resource} requires {field}")]
    MissingScope { resource: String, field: String },

    /// A record came back without an identifier
    #[error("{resource} record has no id")]
    MissingId { resource: String },
}

impl Error {
    /// Create a remote error from a message without an HTTP status.
    ///
    /// Used by non-HTTP implementations of `ForemanApi`.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            status: 0,
            message: message.into(),
        }
    }
}
