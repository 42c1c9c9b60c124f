//! Result objects printed on stdout

use foreman_api::Record;
use foreman_core::{Action, KindSpec, Outcome};
use serde_json::{Value, json};

/// Success object: `{"changed", "<kind>": record, "diff"}`.
///
/// Write-only fields are never echoed back.
pub fn success(kind: &KindSpec, outcome: &Outcome) -> Value {
    let record = redact(kind, outcome.record.clone());

    let (before, after) = match outcome.action {
        Action::Create => (Record::new(), record.clone()),
        Action::Delete => (record.clone(), Record::new()),
        Action::Update => {
            let mut before = Record::new();
            let mut after = Record::new();
            for change in &outcome.changes {
                before.insert(change.field.clone(), change.before.clone());
                after.insert(change.field.clone(), change.after.clone());
            }
            (before, after)
        }
        Action::Noop => (Record::new(), Record::new()),
    };

    let mut result = Record::new();
    result.insert("changed".to_string(), Value::Bool(outcome.changed));
    result.insert(kind.name.to_string(), Value::Object(record));
    result.insert("diff".to_string(), json!({"before": before, "after": after}));
    Value::Object(result)
}

/// Failure object: `{"failed": true, "msg"}`.
pub fn failure(message: &str) -> Value {
    json!({"failed": true, "msg": message})
}

fn redact(kind: &KindSpec, mut record: Record) -> Record {
    for field in kind.write_only {
        record.remove(*field);
    }
    record
}
