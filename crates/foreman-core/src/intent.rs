//! Lifecycle intent declared by the caller

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Target state of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleIntent {
    /// The resource must exist and match the declared fields
    #[default]
    Present,
    /// The resource must not exist
    Absent,
}

impl FromStr for LifecycleIntent {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "present" => Ok(LifecycleIntent::Present),
            "absent" => Ok(LifecycleIntent::Absent),
            _ => Err(Error::configuration(format!(
                "state must be one of present, absent; got {}",
                s
            ))),
        }
    }
}

impl fmt::Display for LifecycleIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleIntent::Present => write!(f, "present"),
            LifecycleIntent::Absent => write!(f, "absent"),
        }
    }
}
