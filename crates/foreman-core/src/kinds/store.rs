//! Kind registry storage

use std::collections::HashMap;

use foreman_api::Record;

use super::types::KindSpec;
use crate::desired::DesiredState;
use crate::error::Result;

/// Parser turning a flat parameter mapping into a desired state.
pub type ParamParser = fn(Record) -> Result<DesiredState>;

/// A registered kind: its configuration record and its parameter schema.
#[derive(Clone, Copy)]
pub struct KindEntry {
    spec: &'static KindSpec,
    parser: ParamParser,
}

impl KindEntry {
    /// Create a registry entry.
    pub fn new(spec: &'static KindSpec, parser: ParamParser) -> Self {
        Self { spec, parser }
    }

    /// Kind name.
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    /// Configuration record.
    pub fn spec(&self) -> &'static KindSpec {
        self.spec
    }

    /// Parse the kind's parameters.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` for missing, unknown or malformed
    /// parameters.
    pub fn parse(&self, params: Record) -> Result<DesiredState> {
        (self.parser)(params)
    }
}

impl std::fmt::Debug for KindEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindEntry")
            .field("name", &self.spec.name)
            .finish()
    }
}

/// Central registry of resource kinds, keyed by name.
pub struct KindRegistry {
    kinds: HashMap<&'static str, KindEntry>,
}

impl KindRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Create a registry pre-populated with all built-in kinds.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for entry in super::builtins::builtin_entries() {
            registry.register(entry);
        }
        registry
    }

    /// Register a kind, replacing any kind with the same name.
    pub fn register(&mut self, entry: KindEntry) {
        self.kinds.insert(entry.name(), entry);
    }

    /// Get a kind by name.
    pub fn get(&self, name: &str) -> Option<&KindEntry> {
        self.kinds.get(name)
    }

    /// Check if a kind is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Get the number of registered kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// List all registered kind names (sorted).
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.kinds.keys().copied().collect();
        names.sort();
        names
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}
