//! Kind configuration types

use std::collections::BTreeSet;

use foreman_api::{Record, Resource};

use crate::IDENTIFIER_FIELD;
use crate::error::{Error, Result};

/// How a desired field is matched against the remote value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatch {
    /// JSON equality; a missing remote field counts as `null`
    Exact,
    /// Set equality of the `key` values of two arrays of records
    SetBy { key: &'static str },
    /// Every key of the desired object equals the remote object's key
    Subset,
}

/// A parameter naming a single dependency by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSpec {
    /// Parameter name as declared by the caller (`architecture`)
    pub param: &'static str,
    /// Collection searched for the name
    pub resource: Resource,
    /// Field that receives the resolved identifier (`architecture_id`)
    pub id_field: &'static str,
    /// Retry the search by `title` when the name does not match
    pub search_title: bool,
}

/// A parameter naming a list of dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSpec {
    /// Parameter name as declared by the caller (`roles`)
    pub param: &'static str,
    /// Collection searched for each item
    pub resource: Resource,
    /// Field whose values decide set equality (`name`)
    pub key: &'static str,
    /// Field carrying the resolved ids in payloads (`role_ids`)
    pub payload_ids: Option<&'static str>,
}

/// Fixed configuration of one resource kind.
#[derive(Debug, Clone, Copy)]
pub struct KindSpec {
    /// Kind name used by callers (`hostgroup`)
    pub name: &'static str,
    /// Collection holding records of this kind
    pub resource: Resource,
    /// Fields identifying the record, after reference resolution
    pub natural_key: &'static [&'static str],
    pub references: &'static [ReferenceSpec],
    pub collections: &'static [CollectionSpec],
    /// Fields allowed to drive an update. `None` means every declared field.
    pub updatable: Option<&'static [&'static str]>,
    /// Fields the server rejects on update
    pub non_updatable: &'static [&'static str],
    /// Fields the server accepts but never returns
    pub write_only: &'static [&'static str],
    /// Matching modes other than [`FieldMatch::Exact`]
    pub matchers: &'static [(&'static str, FieldMatch)],
    /// Read the detailed record after a successful search
    pub fetch_detail: bool,
    /// Whether intent `absent` is accepted
    pub supports_absent: bool,
}

impl KindSpec {
    /// Matching mode for a field.
    ///
    /// Collection parameters match as sets over their key.
    pub fn field_match(&self, field: &str) -> FieldMatch {
        if let Some(collection) = self.collections.iter().find(|c| c.param == field) {
            return FieldMatch::SetBy {
                key: collection.key,
            };
        }
        self.matchers
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, mode)| *mode)
            .unwrap_or(FieldMatch::Exact)
    }

    /// Fields of `desired` that take part in the update decision.
    ///
    /// The updatable allow-list (or every declared field), minus the
    /// identifier, non-updatable and write-only fields.
    pub fn compared_fields<'a>(&self, desired: &'a Record) -> Vec<&'a str> {
        desired
            .keys()
            .map(String::as_str)
            .filter(|field| *field != IDENTIFIER_FIELD)
            .filter(|field| self.updatable.is_none_or(|allowed| allowed.contains(field)))
            .filter(|field| !self.non_updatable.contains(field))
            .filter(|field| !self.write_only.contains(field))
            .collect()
    }

    /// Whether a field is non-updatable.
    pub fn is_non_updatable(&self, field: &str) -> bool {
        self.non_updatable.contains(&field)
    }

    /// Whether a field is write-only.
    pub fn is_write_only(&self, field: &str) -> bool {
        self.write_only.contains(&field)
    }

    /// Whether a reference feeds the natural key.
    pub fn is_key_reference(&self, reference: &ReferenceSpec) -> bool {
        self.natural_key.contains(&reference.id_field)
    }

    /// Reference spec for a parameter name.
    pub fn reference(&self, param: &str) -> Option<&ReferenceSpec> {
        self.references.iter().find(|r| r.param == param)
    }

    /// Collection spec for a parameter name.
    pub fn collection(&self, param: &str) -> Option<&CollectionSpec> {
        self.collections.iter().find(|c| c.param == param)
    }

    /// Build the search filter identifying the record.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a key field was not declared.
    pub fn natural_key_filter(&self, resolved: &Record) -> Result<Record> {
        self.natural_key
            .iter()
            .map(|field| {
                resolved
                    .get(*field)
                    .filter(|v| !v.is_null())
                    .map(|v| (field.to_string(), v.clone()))
                    .ok_or_else(|| {
                        Error::configuration(format!(
                            "{} requires {} to identify the record",
                            self.name, field
                        ))
                    })
            })
            .collect()
    }

    /// All fields any update payload must never contain.
    pub fn payload_exclusions(&self) -> BTreeSet<&'static str> {
        let mut excluded: BTreeSet<&'static str> = self.non_updatable.iter().copied().collect();
        excluded.insert(IDENTIFIER_FIELD);
        excluded
    }
}
