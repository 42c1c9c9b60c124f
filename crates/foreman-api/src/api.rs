//! The remote interface injected into the reconciler

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::record::{Record, RecordId};
use crate::resource::Resource;

/// A remote operation, used for error reporting and call logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Search,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Whether the operation changes remote state.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update | Operation::Delete)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Search => write!(f, "search"),
            Operation::Get => write!(f, "get"),
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// One method per remote operation, parameterized by resource.
///
/// Every call blocks until the server answers. Implementations must not
/// retry: a failed call is reported as-is and the reconciliation aborts.
pub trait ForemanApi {
    /// Find the first record of `resource` whose fields equal every field
    /// of `filter`.
    fn search(&self, resource: Resource, filter: &Record) -> Result<Option<Record>>;

    /// Read the detailed representation of a single record.
    fn get(&self, resource: Resource, id: &RecordId) -> Result<Record>;

    /// Create a record and return it as stored by the server.
    fn create(&self, resource: Resource, data: &Record) -> Result<Record>;

    /// Update a record and return it as stored by the server.
    fn update(&self, resource: Resource, id: &RecordId, data: &Record) -> Result<Record>;

    /// Delete a record and return its last representation.
    fn delete(&self, resource: Resource, id: &RecordId) -> Result<Record>;
}
