//! Mutation dispatcher
//!
//! Turns a [`Decision`] into at most one mutating remote call.

use foreman_api::{ForemanApi, Operation, Record, RecordId};
use serde_json::Value;
use tracing::{debug, info};

use crate::compare::Decision;
use crate::error::{Error, Result};
use crate::kinds::KindSpec;
use crate::reconciler::ReconcileOptions;

/// Issues the mutating call a decision calls for.
pub struct Dispatcher<'a> {
    api: &'a dyn ForemanApi,
    options: ReconcileOptions,
}

impl<'a> Dispatcher<'a> {
    pub fn new(api: &'a dyn ForemanApi, options: ReconcileOptions) -> Self {
        Self { api, options }
    }

    /// Carry out `decision` and return `(changed, record)`.
    ///
    /// `desired` holds resolved fields; `remote` is the record found by
    /// natural key. In dry-run mode no call is issued and the record is the
    /// remote one, or the would-be payload for a create.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteCall` if the call fails. Nothing is retried or
    /// rolled back.
    pub fn dispatch(
        &self,
        kind: &KindSpec,
        decision: &Decision,
        desired: &Record,
        remote: Option<Record>,
    ) -> Result<(bool, Record)> {
        let changed = decision.is_change();

        if self.options.dry_run {
            debug!(kind = kind.name, action = %decision.action(), "Dry run, skipping mutation");
            let record = match (decision, remote) {
                (Decision::Create, _) => create_payload(kind, desired),
                (_, Some(remote)) => remote,
                (_, None) => Record::new(),
            };
            return Ok((changed, record));
        }

        match decision {
            Decision::Noop => Ok((false, remote.unwrap_or_default())),
            Decision::Create => {
                let payload = create_payload(kind, desired);
                info!(kind = kind.name, "Creating record");
                let created = self
                    .api
                    .create(kind.resource, &payload)
                    .map_err(|e| Error::remote(Operation::Create, kind.name, e))?;
                Ok((true, created))
            }
            Decision::Update(changes) => {
                let remote = remote.unwrap_or_default();
                let id = record_id(kind, Operation::Update, &remote)?;
                let payload = update_payload(kind, desired, &remote);
                info!(
                    kind = kind.name,
                    %id,
                    fields = ?changes.iter().map(|c| c.field.as_str()).collect::<Vec<_>>(),
                    "Updating record"
                );
                let updated = self
                    .api
                    .update(kind.resource, &id, &payload)
                    .map_err(|e| Error::remote(Operation::Update, kind.name, e))?;
                Ok((true, updated))
            }
            Decision::Delete => {
                let remote = remote.unwrap_or_default();
                let id = record_id(kind, Operation::Delete, &remote)?;
                info!(kind = kind.name, %id, "Deleting record");
                let deleted = self
                    .api
                    .delete(kind.resource, &id)
                    .map_err(|e| Error::remote(Operation::Delete, kind.name, e))?;
                Ok((true, deleted))
            }
        }
    }
}

fn record_id(kind: &KindSpec, operation: Operation, remote: &Record) -> Result<RecordId> {
    RecordId::of(remote).ok_or_else(|| {
        Error::remote(
            operation,
            kind.name,
            foreman_api::Error::MissingId {
                resource: kind.resource.to_string(),
            },
        )
    })
}

/// Payload of a create: every resolved desired field, write-only fields
/// included, with collections sent as id lists where the kind says so.
pub fn create_payload(kind: &KindSpec, desired: &Record) -> Record {
    let mut payload = desired.clone();
    collections_to_ids(kind, &mut payload);
    payload
}

/// Payload of an update.
///
/// The remote record overlaid with every declared desired field, write-only
/// fields included. Only the allow-listed fields decide whether an update
/// happens, but the rest are sent along with it. The identifier and
/// non-updatable fields are always removed.
pub fn update_payload(kind: &KindSpec, desired: &Record, remote: &Record) -> Record {
    let mut payload = remote.clone();
    for (field, value) in desired {
        payload.insert(field.clone(), value.clone());
    }

    collections_to_ids(kind, &mut payload);
    for field in kind.payload_exclusions() {
        payload.remove(field);
    }
    payload
}

/// Replace collection objects by the list of their ids.
fn collections_to_ids(kind: &KindSpec, payload: &mut Record) {
    for collection in kind.collections {
        let Some(ids_field) = collection.payload_ids else {
            continue;
        };
        let Some(items) = payload.remove(collection.param) else {
            continue;
        };

        let ids: Vec<Value> = match items {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_object().and_then(RecordId::of))
                .map(RecordId::into_value)
                .collect(),
            _ => Vec::new(),
        };
        payload.insert(ids_field.to_string(), Value::Array(ids));
    }
}
