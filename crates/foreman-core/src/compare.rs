//! State comparator
//!
//! Decides what a reconciliation has to do from the resolved desired fields
//! and the remote record found by natural key.

use std::fmt;

use foreman_api::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::intent::LifecycleIntent;
use crate::kinds::{FieldMatch, KindSpec};

/// A compared field whose remote value differs from the desired one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub before: Value,
    pub after: Value,
}

/// The outcome of comparing desired and remote state.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Create,
    Update(Vec<FieldChange>),
    Delete,
    Noop,
}

impl Decision {
    /// The kind of action, without the field changes.
    pub fn action(&self) -> Action {
        match self {
            Decision::Create => Action::Create,
            Decision::Update(_) => Action::Update,
            Decision::Delete => Action::Delete,
            Decision::Noop => Action::Noop,
        }
    }

    /// Whether carrying out the decision changes remote state.
    pub fn is_change(&self) -> bool {
        !matches!(self, Decision::Noop)
    }

    /// Field changes of an update; empty for every other decision.
    pub fn changes(&self) -> &[FieldChange] {
        match self {
            Decision::Update(changes) => changes,
            _ => &[],
        }
    }
}

/// Reportable action of a [`Decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
    Noop,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
            Action::Noop => write!(f, "noop"),
        }
    }
}

/// Decide what to do with a record of `kind`.
///
/// `desired` holds resolved fields only: reference names must already be
/// replaced by their id fields.
pub fn decide(
    kind: &KindSpec,
    intent: LifecycleIntent,
    desired: &Record,
    remote: Option<&Record>,
) -> Decision {
    match (remote, intent) {
        (None, LifecycleIntent::Present) => Decision::Create,
        (None, LifecycleIntent::Absent) => Decision::Noop,
        (Some(_), LifecycleIntent::Absent) => Decision::Delete,
        (Some(remote), LifecycleIntent::Present) => {
            let changes: Vec<FieldChange> = kind
                .compared_fields(desired)
                .into_iter()
                .filter_map(|field| {
                    let wanted = desired.get(field)?;
                    let current = remote.get(field);
                    if field_matches(kind.field_match(field), wanted, current) {
                        None
                    } else {
                        Some(FieldChange {
                            field: field.to_string(),
                            before: current.cloned().unwrap_or(Value::Null),
                            after: wanted.clone(),
                        })
                    }
                })
                .collect();

            if changes.is_empty() {
                Decision::Noop
            } else {
                Decision::Update(changes)
            }
        }
    }
}

/// Check a desired value against the remote one under a matching mode.
///
/// A missing remote field counts as `null`.
pub fn field_matches(mode: FieldMatch, desired: &Value, remote: Option<&Value>) -> bool {
    let remote = remote.unwrap_or(&Value::Null);
    match mode {
        FieldMatch::Exact => desired == remote,
        FieldMatch::SetBy { key } => key_set(desired, key) == key_set(remote, key),
        FieldMatch::Subset => match (desired, remote) {
            (Value::Object(wanted), Value::Object(current)) => wanted
                .iter()
                .all(|(k, v)| current.get(k).unwrap_or(&Value::Null) == v),
            _ => desired == remote,
        },
    }
}

/// Sorted, deduplicated `key` values of a collection.
///
/// Items may be records or bare key values; `null` is the empty set.
fn key_set(collection: &Value, key: &str) -> Vec<String> {
    let items = match collection {
        Value::Array(items) => items.as_slice(),
        _ => &[],
    };

    let mut keys: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            Value::Object(record) => record.get(key).map(Value::to_string),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect();
    keys.sort();
    keys.dedup();
    keys
}
