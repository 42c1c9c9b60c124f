//! Idempotent reconciliation of Foreman resources
//!
//! This crate implements the reconciliation procedure shared by every
//! managed resource kind:
//!
//! - **Lookup resolver**: translates human-readable references (an
//!   architecture name, a role) into remote identifiers
//! - **State comparator**: decides between create, update, delete and no-op
//! - **Mutation dispatcher**: issues at most one mutating call
//! - **Kind registry**: fixed per-kind configuration records ([`KindSpec`])
//!   and the parameter schema that turns a flat mapping into a
//!   [`DesiredState`]
//!
//! # Architecture
//!
//! ```text
//!   params ──> DesiredState ──> Resolver ──> search ──> decide ──> dispatch
//!                                  |           |                     |
//!                                  +------- ForemanApi (injected) ---+
//! ```
//!
//! # Example
//!
//! ```ignore
//! use foreman_core::{KindRegistry, Reconciler};
//!
//! let registry = KindRegistry::with_builtins();
//! let entry = registry.get("domain").unwrap();
//! let desired = entry.parse(params)?;
//! let outcome = Reconciler::new(&api).reconcile(entry.spec(), &desired)?;
//! println!("changed: {}", outcome.changed);
//! ```

pub mod compare;
pub mod desired;
pub mod dispatch;
pub mod error;
pub mod intent;
pub mod kinds;
pub mod params;
pub mod reconciler;
pub mod resolver;

pub use compare::{Action, Decision, FieldChange, decide};
pub use desired::DesiredState;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use intent::LifecycleIntent;
pub use kinds::{CollectionSpec, FieldMatch, KindEntry, KindRegistry, KindSpec, ReferenceSpec};
pub use reconciler::{Outcome, ReconcileOptions, Reconciler};
pub use resolver::Resolver;

/// Field holding a record's opaque identifier.
pub const IDENTIFIER_FIELD: &str = "id";
