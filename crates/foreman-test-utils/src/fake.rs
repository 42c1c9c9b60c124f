//! [`FakeForeman`]: an in-memory Foreman server for reconciliation tests.

use std::cell::RefCell;
use std::collections::HashMap;

use foreman_api::{
    Error, ForemanApi, Operation, Record, RecordId, Resource, Result, record_matches,
};
use serde_json::Value;

/// One call received by a [`FakeForeman`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub operation: Operation,
    pub resource: Resource,
    /// Body of a create or update
    pub data: Option<Record>,
}

/// Expands an id list into the full records on detail reads, the way
/// Foreman shows a user's roles.
#[derive(Debug, Clone)]
struct CollectionLink {
    owner: Resource,
    ids_field: &'static str,
    objects_field: &'static str,
    target: Resource,
}

/// In-memory [`ForemanApi`] with per-resource id counters and a call log.
///
/// # Example
///
/// ```rust
/// use foreman_api::{ForemanApi, Operation, Record, Resource};
/// use foreman_test_utils::FakeForeman;
/// use serde_json::json;
///
/// let fake = FakeForeman::new();
/// fake.seed(Resource::Domains, json!({"name": "example.com"}));
///
/// let mut filter = Record::new();
/// filter.insert("name".into(), json!("example.com"));
/// assert!(fake.search(Resource::Domains, &filter).unwrap().is_some());
/// assert_eq!(fake.calls(), vec![(Operation::Search, Resource::Domains)]);
/// ```
#[derive(Debug, Default)]
pub struct FakeForeman {
    records: RefCell<HashMap<Resource, Vec<Record>>>,
    next_ids: RefCell<HashMap<Resource, u64>>,
    log: RefCell<Vec<Call>>,
    failures: RefCell<HashMap<(Operation, Resource), String>>,
    links: Vec<CollectionLink>,
}

impl FakeForeman {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand `ids_field` of `owner` records into `objects_field` on
    /// detail reads, looking the ids up in `target`.
    ///
    /// Search results then omit `objects_field`, as Foreman's index views
    /// do.
    pub fn with_collection_link(
        mut self,
        owner: Resource,
        ids_field: &'static str,
        objects_field: &'static str,
        target: Resource,
    ) -> Self {
        self.links.push(CollectionLink {
            owner,
            ids_field,
            objects_field,
            target,
        });
        self
    }

    /// Store a record directly, assigning the next id. Not logged.
    ///
    /// # Panics
    /// Panics if `value` is not a JSON object.
    pub fn seed(&self, resource: Resource, value: Value) -> Record {
        let Value::Object(mut record) = value else {
            panic!("FakeForeman::seed: {} record must be an object", resource);
        };
        record.insert("id".to_string(), Value::from(self.next_id(resource)));
        self.records
            .borrow_mut()
            .entry(resource)
            .or_default()
            .push(record.clone());
        record
    }

    /// Make every `operation` on `resource` fail with `message`.
    pub fn fail_on(&self, operation: Operation, resource: Resource, message: &str) {
        self.failures
            .borrow_mut()
            .insert((operation, resource), message.to_string());
    }

    /// All stored records of a resource, as stored (not expanded).
    pub fn records(&self, resource: Resource) -> Vec<Record> {
        self.records
            .borrow()
            .get(&resource)
            .cloned()
            .unwrap_or_default()
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<(Operation, Resource)> {
        self.log
            .borrow()
            .iter()
            .map(|call| (call.operation, call.resource))
            .collect()
    }

    /// Resources of every call of one operation.
    pub fn calls_of(&self, operation: Operation) -> Vec<Resource> {
        self.log
            .borrow()
            .iter()
            .filter(|call| call.operation == operation)
            .map(|call| call.resource)
            .collect()
    }

    /// Every create, update and delete received so far.
    pub fn mutating_calls(&self) -> Vec<(Operation, Resource)> {
        self.calls()
            .into_iter()
            .filter(|(operation, _)| operation.is_mutating())
            .collect()
    }

    /// Bodies sent with every call of one operation.
    pub fn payloads(&self, operation: Operation) -> Vec<Record> {
        self.log
            .borrow()
            .iter()
            .filter(|call| call.operation == operation)
            .filter_map(|call| call.data.clone())
            .collect()
    }

    fn next_id(&self, resource: Resource) -> u64 {
        let mut ids = self.next_ids.borrow_mut();
        let next = ids.entry(resource).or_insert(0);
        *next += 1;
        *next
    }

    fn receive(
        &self,
        operation: Operation,
        resource: Resource,
        data: Option<&Record>,
    ) -> Result<()> {
        self.log.borrow_mut().push(Call {
            operation,
            resource,
            data: data.cloned(),
        });
        match self.failures.borrow().get(&(operation, resource)) {
            Some(message) => Err(Error::remote(message.clone())),
            None => Ok(()),
        }
    }

    fn position(&self, resource: Resource, id: &RecordId) -> Result<usize> {
        self.records
            .borrow()
            .get(&resource)
            .and_then(|records| {
                records
                    .iter()
                    .position(|r| RecordId::of(r).as_ref() == Some(id))
            })
            .ok_or_else(|| Error::Remote {
                status: 404,
                message: format!("Resource {} not found by id '{}'", resource.element(), id),
            })
    }

    fn expand(&self, resource: Resource, mut record: Record) -> Record {
        for link in self.links.iter().filter(|l| l.owner == resource) {
            let Some(Value::Array(ids)) = record.get(link.ids_field) else {
                continue;
            };
            let targets = self.records(link.target);
            let objects: Vec<Value> = ids
                .iter()
                .filter_map(|id| {
                    targets
                        .iter()
                        .find(|t| t.get("id") == Some(id))
                        .cloned()
                        .map(Value::Object)
                })
                .collect();
            record.insert(link.objects_field.to_string(), Value::Array(objects));
        }
        record
    }

    fn summarize(&self, resource: Resource, mut record: Record) -> Record {
        for link in self.links.iter().filter(|l| l.owner == resource) {
            record.remove(link.objects_field);
        }
        record
    }
}

impl ForemanApi for FakeForeman {
    fn search(&self, resource: Resource, filter: &Record) -> Result<Option<Record>> {
        self.receive(Operation::Search, resource, None)?;
        let found = self
            .records(resource)
            .into_iter()
            .find(|record| record_matches(record, filter));
        Ok(found.map(|record| self.summarize(resource, record)))
    }

    fn get(&self, resource: Resource, id: &RecordId) -> Result<Record> {
        self.receive(Operation::Get, resource, None)?;
        let index = self.position(resource, id)?;
        let record = self.records(resource).swap_remove(index);
        Ok(self.expand(resource, record))
    }

    fn create(&self, resource: Resource, data: &Record) -> Result<Record> {
        self.receive(Operation::Create, resource, Some(data))?;
        let created = self.seed(resource, Value::Object(data.clone()));
        Ok(self.expand(resource, created))
    }

    fn update(&self, resource: Resource, id: &RecordId, data: &Record) -> Result<Record> {
        self.receive(Operation::Update, resource, Some(data))?;
        let index = self.position(resource, id)?;
        let updated = {
            let mut records = self.records.borrow_mut();
            let stored = &mut records.entry(resource).or_default()[index];
            for (key, value) in data {
                stored.insert(key.clone(), value.clone());
            }
            stored.clone()
        };
        Ok(self.expand(resource, updated))
    }

    fn delete(&self, resource: Resource, id: &RecordId) -> Result<Record> {
        self.receive(Operation::Delete, resource, None)?;
        let index = self.position(resource, id)?;
        let deleted = self
            .records
            .borrow_mut()
            .entry(resource)
            .or_default()
            .remove(index);
        Ok(deleted)
    }
}
