//! Parameter schemas of the built-in kinds
//!
//! Each kind declares a typed parameter struct. Parsing rejects unknown
//! and malformed parameters before any remote call is made; the struct then
//! converts itself into a [`DesiredState`].

mod compute_attribute;
mod compute_resource;
mod domain;
mod hostgroup;
mod user;

use foreman_api::Record;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::desired::DesiredState;
use crate::error::{Error, Result};

pub use compute_attribute::ComputeAttributeParams;
pub use compute_resource::ComputeResourceParams;
pub use domain::DomainParams;
pub use hostgroup::HostgroupParams;
pub use user::UserParams;

/// A kind's parameter schema.
pub trait KindParams: DeserializeOwned {
    /// Validate cross-field constraints and build the desired state.
    fn into_desired(self) -> Result<DesiredState>;
}

/// Parse a flat parameter mapping with the schema `P`.
///
/// # Errors
///
/// Returns `Error::Configuration` naming the offending parameter.
pub fn parse<P: KindParams>(params: Record) -> Result<DesiredState> {
    let typed: P = serde_json::from_value(Value::Object(params))
        .map_err(|e| Error::configuration(e.to_string()))?;
    typed.into_desired()
}

/// Deserialize an optional boolean that may also be given as a string
/// (`yes`, `no`, `true`, `false`, `on`, `off`, `1`, `0`).
pub fn optional_flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(b)) => Ok(Some(b)),
        Some(Flag::Text(s)) => match s.to_lowercase().as_str() {
            "yes" | "true" | "on" | "1" => Ok(Some(true)),
            "no" | "false" | "off" | "0" => Ok(Some(false)),
            _ => Err(serde::de::Error::custom(format!(
                "expected a boolean, got {:?}",
                s
            ))),
        },
    }
}
