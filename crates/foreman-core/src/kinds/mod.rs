//! Per-kind configuration records and the kind registry
//!
//! Every managed resource kind is described by a [`KindSpec`]: which
//! collection it lives in, its natural key, which parameters are references
//! and how fields are partitioned for updates. The reconciler is generic
//! over these records, so adding a kind never touches comparator logic.

mod builtins;
mod store;
mod types;

pub use builtins::{
    BUILTIN_COUNT, COMPUTE_ATTRIBUTE, COMPUTE_RESOURCE, DOMAIN, HOSTGROUP, USER,
    builtin_entries, provider_params,
};
pub use store::{KindEntry, KindRegistry};
pub use types::{CollectionSpec, FieldMatch, KindSpec, ReferenceSpec};
