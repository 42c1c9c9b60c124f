//! Desired state declared by the caller

use std::collections::BTreeMap;

use foreman_api::Record;
use serde_json::Value;

use crate::intent::LifecycleIntent;

/// What the caller wants a single remote object to look like.
///
/// Only declared parameters are kept: an undeclared optional parameter
/// never reaches the comparator, so it can neither trigger nor suppress an
/// update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredState {
    /// Target lifecycle state
    pub intent: LifecycleIntent,
    /// Plain fields, compared as-is after resolution
    pub fields: Record,
    /// Reference parameters (param name → human-readable name)
    pub references: BTreeMap<String, String>,
    /// Collection references (param name → names or search filters)
    pub collections: BTreeMap<String, Vec<Value>>,
}

impl DesiredState {
    /// Create an empty desired state with the given intent.
    pub fn new(intent: LifecycleIntent) -> Self {
        Self {
            intent,
            ..Self::default()
        }
    }

    /// Declare a plain field.
    pub fn with_field(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// Declare a plain field if a value was given.
    pub fn with_optional_field<T: Into<Value>>(self, field: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.with_field(field, value),
            None => self,
        }
    }

    /// Declare a reference parameter if a name was given.
    pub fn with_reference(mut self, param: &str, name: Option<String>) -> Self {
        if let Some(name) = name {
            self.references.insert(param.to_string(), name);
        }
        self
    }

    /// Declare a collection reference if items were given.
    pub fn with_collection(mut self, param: &str, items: Option<Vec<Value>>) -> Self {
        if let Some(items) = items {
            self.collections.insert(param.to_string(), items);
        }
        self
    }
}
