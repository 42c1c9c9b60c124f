//! Invocation arguments and layered connection settings
//!
//! The runner hands over one flat JSON object. It mixes three groups of
//! keys which are split apart here:
//!
//! - connection keys (`foreman_host`, `foreman_port`, ...)
//! - runner-private keys (`_ansible_*`), of which only `_ansible_check_mode`
//!   is honoured
//! - the kind's own parameters
//!
//! Connection settings are layered: parameters > `FOREMAN_*` environment
//! variables > config file > defaults.

use std::path::{Path, PathBuf};

use foreman_api::connection::{DEFAULT_HOST, DEFAULT_PORT};
use foreman_api::{Connection, Record};
use foreman_core::params::optional_flag;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::error::{CliError, Result};

/// Key wrapping the arguments in runner-generated files.
const MODULE_ARGS_KEY: &str = "ANSIBLE_MODULE_ARGS";

const RUNNER_PREFIX: &str = "_ansible_";
const CHECK_MODE_KEY: &str = "_ansible_check_mode";

const CONNECTION_KEYS: &[&str] = &[
    "foreman_host",
    "foreman_port",
    "foreman_user",
    "foreman_pass",
    "foreman_validate_certs",
];

/// One invocation's arguments, split by concern.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Connection settings given as parameters
    pub connection: ConnectionLayer,
    /// Parameters of the kind
    pub params: Record,
    /// Whether the runner asked for check mode
    pub check_mode: bool,
}

impl Invocation {
    /// Split a runner argument object.
    ///
    /// # Errors
    ///
    /// Returns `CliError::User` if the input is not an object, and
    /// `CliError::Json` if a connection key is malformed.
    pub fn from_args(args: Value) -> Result<Self> {
        let mut args = match args {
            Value::Object(mut outer) => match outer.remove(MODULE_ARGS_KEY) {
                Some(Value::Object(inner)) => inner,
                Some(_) => {
                    return Err(CliError::user(format!("{} must be an object", MODULE_ARGS_KEY)));
                }
                None => outer,
            },
            _ => return Err(CliError::user("arguments must be a JSON object")),
        };

        let mut connection = Record::new();
        for key in CONNECTION_KEYS {
            if let Some(value) = args.remove(*key) {
                connection.insert(key.to_string(), value);
            }
        }
        let params: ConnectionParams = serde_json::from_value(Value::Object(connection))?;

        let check_mode = matches!(args.get(CHECK_MODE_KEY), Some(Value::Bool(true)));
        args.retain(|key, _| !key.starts_with(RUNNER_PREFIX));

        Ok(Self {
            connection: params.into(),
            params: args,
            check_mode,
        })
    }
}

/// Connection keys as given in the parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConnectionParams {
    foreman_host: Option<String>,
    #[serde(default, deserialize_with = "optional_port")]
    foreman_port: Option<u16>,
    foreman_user: Option<String>,
    foreman_pass: Option<String>,
    #[serde(default, deserialize_with = "optional_flag")]
    foreman_validate_certs: Option<bool>,
}

impl From<ConnectionParams> for ConnectionLayer {
    fn from(params: ConnectionParams) -> Self {
        Self {
            host: params.foreman_host,
            port: params.foreman_port,
            user: params.foreman_user,
            password: params.foreman_pass,
            validate_certs: params.foreman_validate_certs,
        }
    }
}

/// Port given as a number or a numeric string.
fn optional_port<'de, D>(deserializer: D) -> std::result::Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Option::<Port>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Port::Number(port)) => Ok(Some(port)),
        Some(Port::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid port: {:?}", s))),
    }
}

/// One layer of connection settings. Unset fields fall through to the
/// next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionLayer {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub validate_certs: Option<bool>,
}

impl ConnectionLayer {
    /// Read the `FOREMAN_*` variables through `lookup`.
    ///
    /// Unparseable port or flag values are reported rather than ignored.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("FOREMAN_PORT") {
            Some(port) => Some(
                port.trim()
                    .parse()
                    .map_err(|_| CliError::user(format!("FOREMAN_PORT is not a port: {}", port)))?,
            ),
            None => None,
        };
        let validate_certs = match lookup("FOREMAN_VALIDATE_CERTS") {
            Some(flag) => Some(parse_flag(&flag).ok_or_else(|| {
                CliError::user(format!("FOREMAN_VALIDATE_CERTS is not a boolean: {}", flag))
            })?),
            None => None,
        };

        Ok(Self {
            host: lookup("FOREMAN_HOST"),
            port,
            user: lookup("FOREMAN_USER"),
            password: lookup("FOREMAN_PASSWORD"),
            validate_certs,
        })
    }

    /// Read the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Fill unset fields from `lower`.
    pub fn or(self, lower: ConnectionLayer) -> Self {
        Self {
            host: self.host.or(lower.host),
            port: self.port.or(lower.port),
            user: self.user.or(lower.user),
            password: self.password.or(lower.password),
            validate_certs: self.validate_certs.or(lower.validate_certs),
        }
    }

    /// Apply defaults and check required settings.
    ///
    /// # Errors
    ///
    /// Returns `CliError::User` naming the parameter if the user or
    /// password is missing.
    pub fn into_connection(self) -> Result<Connection> {
        let user = self
            .user
            .ok_or_else(|| CliError::user("missing required arguments: foreman_user"))?;
        let password = self
            .password
            .ok_or_else(|| CliError::user("missing required arguments: foreman_pass"))?;

        Ok(Connection::new(
            self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            self.port.unwrap_or(DEFAULT_PORT),
            user,
            password,
        )
        .with_validate_certs(self.validate_certs.unwrap_or(true)))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "true" | "on" | "1" => Some(true),
        "no" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Contents of the optional TOML config file.
///
/// ```toml
/// [connection]
/// host = "foreman.example.com"
/// user = "admin"
/// validate_certs = false
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub connection: ConnectionLayer,
}

impl FileConfig {
    /// Parse config file contents.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the config file.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        debug!(path = %path.display(), "Loading config file");
        let content = std::fs::read_to_string(&path).map_err(|e| {
            CliError::user(format!("Could not read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }
}

/// `<config dir>/foreman-reconcile/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("foreman-reconcile").join("config.toml"))
}
