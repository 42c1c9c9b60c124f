//! Reconciliation procedure
//!
//! One call to [`Reconciler::reconcile`] brings one remote object to the
//! desired state: resolve references, find the record by natural key,
//! decide, dispatch.

use foreman_api::{ForemanApi, Operation, Record, RecordId};
use serde::Serialize;
use tracing::debug;

use crate::compare::{Action, FieldChange, decide};
use crate::desired::DesiredState;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::intent::LifecycleIntent;
use crate::kinds::KindSpec;
use crate::resolver::Resolver;

/// Options for a reconciliation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Decide and report, but issue no mutating call
    pub dry_run: bool,
}

/// Result of a reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Whether remote state was (or, in dry-run mode, would be) changed
    pub changed: bool,
    /// The record as returned by the last remote call
    pub record: Record,
    pub action: Action,
    /// Fields an update changed; empty for other actions
    pub changes: Vec<FieldChange>,
}

/// Runs reconciliations against an injected remote API.
pub struct Reconciler<'a> {
    api: &'a dyn ForemanApi,
    options: ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(api: &'a dyn ForemanApi) -> Self {
        Self {
            api,
            options: ReconcileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    /// Bring the record of `kind` identified by `desired` to its intent.
    ///
    /// # Errors
    ///
    /// - `Error::Configuration` before any remote call, if the desired
    ///   state cannot be reconciled for this kind
    /// - `Error::Resolution` if a reference does not resolve; no mutation
    ///   is issued
    /// - `Error::RemoteCall` if the search, read or mutation fails
    pub fn reconcile(&self, kind: &KindSpec, desired: &DesiredState) -> Result<Outcome> {
        if desired.intent == LifecycleIntent::Absent && !kind.supports_absent {
            return Err(Error::configuration(format!(
                "{} does not support state absent",
                kind.name
            )));
        }

        let resolved = Resolver::new(self.api).resolve_state(kind, desired)?;
        let filter = kind.natural_key_filter(&resolved)?;
        let remote = self.find(kind, &filter)?;

        let decision = decide(kind, desired.intent, &resolved, remote.as_ref());
        debug!(kind = kind.name, action = %decision.action(), "Decided");

        let (changed, record) =
            Dispatcher::new(self.api, self.options).dispatch(kind, &decision, &resolved, remote)?;

        Ok(Outcome {
            changed,
            record,
            action: decision.action(),
            changes: decision.changes().to_vec(),
        })
    }

    fn find(&self, kind: &KindSpec, filter: &Record) -> Result<Option<Record>> {
        let found = self
            .api
            .search(kind.resource, filter)
            .map_err(|e| Error::remote(Operation::Search, kind.name, e))?;

        let Some(found) = found else {
            debug!(kind = kind.name, "No remote record");
            return Ok(None);
        };
        if !kind.fetch_detail {
            return Ok(Some(found));
        }

        let id = RecordId::of(&found).ok_or_else(|| {
            Error::remote(
                Operation::Get,
                kind.name,
                foreman_api::Error::MissingId {
                    resource: kind.resource.to_string(),
                },
            )
        })?;
        let detail = self
            .api
            .get(kind.resource, &id)
            .map_err(|e| Error::remote(Operation::Get, kind.name, e))?;
        Ok(Some(detail))
    }
}
