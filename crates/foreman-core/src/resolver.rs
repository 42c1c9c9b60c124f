//! Lookup resolver
//!
//! Translates the human-readable references of a desired state into the
//! identifiers Foreman uses internally. Every lookup is a fresh read-only
//! search; nothing is cached between invocations.

use foreman_api::{ForemanApi, Record, RecordId};
use serde_json::Value;
use tracing::debug;

use crate::desired::DesiredState;
use crate::error::{Error, Result};
use crate::intent::LifecycleIntent;
use crate::kinds::{CollectionSpec, KindSpec, ReferenceSpec};

/// Resolves references through the injected remote API.
pub struct Resolver<'a> {
    api: &'a dyn ForemanApi,
}

impl<'a> Resolver<'a> {
    /// Create a resolver using the given API.
    pub fn new(api: &'a dyn ForemanApi) -> Self {
        Self { api }
    }

    /// Resolve one reference to the identifier of the matching record.
    ///
    /// Searches by `name`, then by `title` if the reference allows it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolution` if nothing matches or a search fails.
    pub fn resolve(&self, spec: &ReferenceSpec, name: &str) -> Result<Value> {
        let fields: &[&str] = if spec.search_title {
            &["name", "title"]
        } else {
            &["name"]
        };

        let record = self.find_by(spec.param, spec.resource, fields, name)?;
        let id = RecordId::of(&record).ok_or_else(|| Error::Resolution {
            kind: spec.param.to_string(),
            value: name.to_string(),
            reason: format!("{} record has no id", spec.resource),
        })?;

        debug!(kind = spec.param, %name, %id, "Resolved reference");
        Ok(id.into_value())
    }

    /// Resolve every item of a collection reference.
    ///
    /// String items are searched by `name`; object items are used as the
    /// search filter as-is. Every item must resolve.
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolution` naming the first item that fails.
    pub fn resolve_collection(
        &self,
        spec: &CollectionSpec,
        items: &[Value],
    ) -> Result<Vec<Record>> {
        items
            .iter()
            .map(|item| {
                let (filter, label) = match item {
                    Value::String(name) => {
                        let mut filter = Record::new();
                        filter.insert("name".to_string(), item.clone());
                        (filter, name.clone())
                    }
                    Value::Object(filter) => (filter.clone(), item.to_string()),
                    other => {
                        return Err(Error::configuration(format!(
                            "{} items must be names or search filters, got {}",
                            spec.param, other
                        )));
                    }
                };

                self.api
                    .search(spec.resource, &filter)
                    .map_err(|e| Error::Resolution {
                        kind: spec.param.to_string(),
                        value: label.clone(),
                        reason: e.to_string(),
                    })?
                    .ok_or_else(|| Error::Resolution {
                        kind: spec.param.to_string(),
                        value: label,
                        reason: "not found".to_string(),
                    })
            })
            .collect()
    }

    /// Build the resolved field set of a desired state.
    ///
    /// Plain fields are copied; each reference becomes its id field and each
    /// collection becomes the list of matching records. With intent
    /// `absent`, only references feeding the natural key are resolved.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` for references the kind does not
    /// declare, and `Error::Resolution` for references that do not resolve.
    pub fn resolve_state(&self, kind: &KindSpec, desired: &DesiredState) -> Result<Record> {
        let mut resolved = desired.fields.clone();
        let deleting = desired.intent == LifecycleIntent::Absent;

        for (param, name) in &desired.references {
            let spec = kind.reference(param).ok_or_else(|| {
                Error::configuration(format!("{} has no reference named {}", kind.name, param))
            })?;
            if deleting && !kind.is_key_reference(spec) {
                continue;
            }
            let id = self.resolve(spec, name)?;
            resolved.insert(spec.id_field.to_string(), id);
        }

        for (param, items) in &desired.collections {
            let spec = kind.collection(param).ok_or_else(|| {
                Error::configuration(format!("{} has no collection named {}", kind.name, param))
            })?;
            if deleting {
                continue;
            }
            let records = self.resolve_collection(spec, items)?;
            resolved.insert(
                spec.param.to_string(),
                Value::Array(records.into_iter().map(Value::Object).collect()),
            );
        }

        Ok(resolved)
    }

    fn find_by(
        &self,
        kind: &str,
        resource: foreman_api::Resource,
        fields: &[&str],
        value: &str,
    ) -> Result<Record> {
        for field in fields {
            let mut filter = Record::new();
            filter.insert(field.to_string(), Value::String(value.to_string()));

            let found = self
                .api
                .search(resource, &filter)
                .map_err(|e| Error::Resolution {
                    kind: kind.to_string(),
                    value: value.to_string(),
                    reason: e.to_string(),
                })?;
            if let Some(record) = found {
                return Ok(record);
            }
        }

        Err(Error::Resolution {
            kind: kind.to_string(),
            value: value.to_string(),
            reason: "not found".to_string(),
        })
    }
}
