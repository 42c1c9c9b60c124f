//! Records returned by the Foreman server

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON object as returned or accepted by the Foreman API.
pub type Record = serde_json::Map<String, Value>;

/// Opaque identifier of a remote record.
///
/// Foreman uses integers, but nothing here depends on that: the raw JSON
/// value is kept so it compares equal to the `*_id` fields of other records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Value);

impl RecordId {
    /// Take the `id` field of a record, if it holds a number or a string.
    pub fn of(record: &Record) -> Option<Self> {
        match record.get("id") {
            Some(v @ Value::Number(_)) => Some(Self(v.clone())),
            Some(Value::String(s)) if !s.is_empty() => Some(Self(Value::String(s.clone()))),
            _ => None,
        }
    }

    /// Consume into the JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(Value::from(id))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}

/// Check whether every field of `filter` is present in `record` with an
/// equal value.
pub fn record_matches(record: &Record, filter: &Record) -> bool {
    filter
        .iter()
        .all(|(key, expected)| record.get(key) == Some(expected))
}
