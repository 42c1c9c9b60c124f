//! Connection settings for a Foreman server

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default host when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default HTTPS port of the Foreman API.
pub const DEFAULT_PORT: u16 = 443;

/// Host, port and credentials used for every call of one invocation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Hostname or IP address. A `http://` or `https://` prefix selects
    /// the scheme; plain hosts use HTTPS.
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Verify the server's TLS certificate
    #[serde(default = "default_validate_certs")]
    pub validate_certs: bool,
}

fn default_validate_certs() -> bool {
    true
}

impl Connection {
    /// Create connection settings with certificate validation enabled.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            validate_certs: true,
        }
    }

    /// Disable or enable TLS certificate validation.
    pub fn with_validate_certs(mut self, validate: bool) -> Self {
        self.validate_certs = validate;
        self
    }

    /// Base URL of the API v2 endpoints, without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConnection` if the host or username is empty.
    pub fn base_url(&self) -> Result<String> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(Error::InvalidConnection {
                message: "host must not be empty".to_string(),
            });
        }
        if self.username.is_empty() {
            return Err(Error::InvalidConnection {
                message: "username must not be empty".to_string(),
            });
        }

        let (scheme, host) = if let Some(rest) = host.strip_prefix("http://") {
            ("http", rest)
        } else if let Some(rest) = host.strip_prefix("https://") {
            ("https", rest)
        } else {
            ("https", host)
        };

        Ok(format!("{}://{}:{}/api/v2", scheme, host, self.port))
    }
}

// Keep the password out of logs.
impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"********")
            .field("validate_certs", &self.validate_certs)
            .finish()
    }
}
