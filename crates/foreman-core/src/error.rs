//! Error types for foreman-core

use foreman_api::Operation;

/// Result type for foreman-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a reconciliation
///
/// Every variant is fatal to the current invocation; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced dependency could not be found, or looking it up failed
    #[error("Could not resolve {kind} '{value}': {reason}")]
    Resolution {
        kind: String,
        value: String,
        reason: String,
    },

    /// A remote search, read or mutation failed
    #[error("Could not {operation} {resource}: {source}")]
    RemoteCall {
        operation: Operation,
        resource: String,
        source: foreman_api::Error,
    },

    /// Parameters are missing or malformed; raised before any remote call
    #[error("Invalid parameters: {message}")]
    Configuration { message: String },
}

impl Error {
    /// Create a configuration error with the given message
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wrap a failed remote call
    pub fn remote(
        operation: Operation,
        resource: impl Into<String>,
        source: foreman_api::Error,
    ) -> Self {
        Self::RemoteCall {
            operation,
            resource: resource.into(),
            source,
        }
    }

    /// The remote operation that failed, if this is a remote-call error.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::RemoteCall { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}
