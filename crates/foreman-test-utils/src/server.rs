//! [`ForemanServer`]: a Foreman API v2 look-alike served over real HTTP.
//!
//! Runs an axum router on `127.0.0.1:0` in a background thread with its
//! own tokio runtime, so blocking clients can call it from plain `#[test]`
//! functions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::get;
use foreman_api::{Connection, Record, Resource};
use serde_json::{Value, json};

/// Credentials every request must carry.
pub const USER: &str = "admin";
pub const PASSWORD: &str = "changeme";

type Reply = (StatusCode, Json<Value>);

/// One request received by a [`ForemanServer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: &'static str,
    /// Path below `/api/v2`, e.g. `domains/3`
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct Store {
    collections: HashMap<String, Vec<Record>>,
    next_ids: HashMap<String, u64>,
    requests: Vec<Request>,
    /// Fields a PUT on the collection must not carry
    locked: HashMap<String, Vec<String>>,
}

impl Store {
    fn insert(&mut self, collection: &str, mut record: Record) -> Record {
        let next = self.next_ids.entry(collection.to_string()).or_insert(0);
        *next += 1;
        record.insert("id".to_string(), Value::from(*next));
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    fn position(&self, collection: &str, id: &str) -> Option<usize> {
        self.collections.get(collection)?.iter().position(|r| match r.get("id") {
            Some(Value::Number(n)) => n.to_string() == id,
            Some(Value::String(s)) => s == id,
            _ => false,
        })
    }

    /// Detail view: users show their roles as objects.
    fn expand(&self, mut record: Record) -> Record {
        if let Some(Value::Array(ids)) = record.get("role_ids") {
            let roles: Vec<Value> = self
                .collections
                .get(Resource::Roles.path())
                .map(|roles| {
                    roles
                        .iter()
                        .filter(|role| role.get("id").is_some_and(|id| ids.contains(id)))
                        .cloned()
                        .map(Value::Object)
                        .collect()
                })
                .unwrap_or_default();
            record.insert("roles".to_string(), Value::Array(roles));
        }
        record
    }
}

type Shared = Arc<Mutex<Store>>;

/// Handle to a running fake Foreman server.
///
/// # Example
///
/// ```rust,no_run
/// use foreman_api::{ForemanApi, HttpForeman, Resource};
/// use foreman_test_utils::ForemanServer;
/// use serde_json::json;
///
/// let server = ForemanServer::start();
/// server.seed(Resource::Domains, json!({"name": "example.com"}));
///
/// let api = HttpForeman::new(&server.connection()).unwrap();
/// ```
pub struct ForemanServer {
    port: u16,
    store: Shared,
}

impl ForemanServer {
    /// Bind a free local port and start serving.
    ///
    /// # Panics
    /// Panics if the listener cannot be bound.
    pub fn start() -> Self {
        let listener =
            std::net::TcpListener::bind("127.0.0.1:0").expect("ForemanServer: bind listener");
        listener
            .set_nonblocking(true)
            .expect("ForemanServer: set listener non-blocking");
        let port = listener
            .local_addr()
            .expect("ForemanServer: listener addr")
            .port();

        let store = Shared::default();
        let app = router(store.clone());

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .expect("ForemanServer: build runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener)
                    .expect("ForemanServer: adopt listener");
                axum::serve(listener, app)
                    .await
                    .expect("ForemanServer: serve");
            });
        });

        Self { port, store }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Host value selecting plain HTTP, for `foreman_host`.
    pub fn host(&self) -> String {
        "http://127.0.0.1".to_string()
    }

    /// Connection settings with the accepted credentials.
    pub fn connection(&self) -> Connection {
        Connection::new(self.host(), self.port, USER, PASSWORD)
    }

    /// Store a record directly, assigning the next id. Not logged.
    ///
    /// # Panics
    /// Panics if `value` is not a JSON object.
    pub fn seed(&self, resource: Resource, value: Value) -> Record {
        let Value::Object(record) = value else {
            panic!("ForemanServer::seed: {} record must be an object", resource);
        };
        self.lock().insert(resource.path(), record)
    }

    /// Reject updates of `resource` carrying any of `fields`, the way
    /// Foreman rejects nested parameters it cannot change.
    pub fn lock_fields(&self, resource: Resource, fields: &[&str]) {
        self.lock().locked.insert(
            resource.path().to_string(),
            fields.iter().map(|f| f.to_string()).collect(),
        );
    }

    /// All stored records of a resource.
    pub fn records(&self, resource: Resource) -> Vec<Record> {
        self.lock()
            .collections
            .get(resource.path())
            .cloned()
            .unwrap_or_default()
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    /// `(method, path)` of every POST, PUT and DELETE received so far.
    pub fn mutating_requests(&self) -> Vec<(&'static str, String)> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != "GET")
            .map(|r| (r.method, r.path))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        lock(&self.store)
    }
}

fn lock(store: &Shared) -> MutexGuard<'_, Store> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn router(store: Shared) -> Router {
    Router::new()
        .route(
            "/api/v2/compute_resources/{cr}/compute_profiles/{cp}/compute_attributes",
            get(list_compute_attributes).post(create_compute_attribute),
        )
        .route("/api/v2/{collection}", get(list).post(create))
        .route(
            "/api/v2/{collection}/{id}",
            get(show).put(update).delete(destroy),
        )
        .with_state(store)
}

fn reply(status: StatusCode, body: Value) -> Reply {
    (status, Json(body))
}

fn message(status: StatusCode, text: &str) -> Reply {
    reply(status, json!({"error": {"message": text}}))
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "))
}

fn log(
    store: &mut Store,
    method: &'static str,
    path: String,
    query: HashMap<String, String>,
    body: Option<Value>,
) {
    store.requests.push(Request {
        method,
        path,
        query,
        body,
    });
}

/// Parse `k="v" and k2="v2"` into pairs.
fn search_terms(search: &str) -> Vec<(String, String)> {
    search
        .split(" and ")
        .filter_map(|term| term.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value)
                .replace("\\\"", "\"");
            (key.trim().to_string(), value)
        })
        .collect()
}

fn matches_terms(record: &Record, terms: &[(String, String)]) -> bool {
    terms.iter().all(|(key, expected)| match record.get(key) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == *expected,
        None => false,
    })
}

fn index(
    store: &Store,
    collection: &str,
    query: &HashMap<String, String>,
    scope: &[(&str, &str)],
) -> Value {
    let terms = query.get("search").map(|s| search_terms(s)).unwrap_or_default();
    let results: Vec<Value> = store
        .collections
        .get(collection)
        .map(|records| {
            records
                .iter()
                .filter(|r| {
                    scope.iter().all(|(field, value)| {
                        r.get(*field).is_some_and(|v| v.to_string() == *value)
                    })
                })
                .filter(|r| matches_terms(r, &terms))
                .map(|r| {
                    let mut summary = r.clone();
                    summary.remove("roles");
                    Value::Object(summary)
                })
                .collect()
        })
        .unwrap_or_default();

    json!({
        "total": results.len(),
        "subtotal": results.len(),
        "page": 1,
        "per_page": query.get("per_page").and_then(|p| p.parse::<u64>().ok()).unwrap_or(20),
        "search": query.get("search"),
        "results": results,
    })
}

/// Unwrap `{"<element>": {...}}`.
fn element(body: &Value) -> Option<Record> {
    match body {
        Value::Object(wrapper) if wrapper.len() == 1 => {
            wrapper.values().next()?.as_object().cloned()
        }
        _ => None,
    }
}

fn create_in(store: &mut Store, collection: &str, body: &Value, scope: &[(&str, &str)]) -> Reply {
    let Some(mut record) = element(body) else {
        return message(StatusCode::UNPROCESSABLE_ENTITY, "Body must wrap one element");
    };

    for key in ["name", "login"] {
        let taken = record.get(key).is_some_and(|wanted| {
            store
                .collections
                .get(collection)
                .is_some_and(|records| records.iter().any(|r| r.get(key) == Some(wanted)))
        });
        if taken && collection != Resource::ComputeAttributes.path() {
            return reply(
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"error": {"full_messages": [format!("{} has already been taken", key)]}}),
            );
        }
    }

    for (field, value) in scope {
        let value = value
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(value.to_string()));
        record.insert(field.to_string(), value);
    }
    let created = store.insert(collection, record);
    reply(StatusCode::CREATED, Value::Object(store.expand(created)))
}

async fn list(
    State(store): State<Shared>,
    Path(collection): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Reply {
    let mut store = lock(&store);
    log(&mut store, "GET", collection.clone(), query.clone(), None);
    if !authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Unable to authenticate user");
    }
    reply(StatusCode::OK, index(&store, &collection, &query, &[]))
}

async fn list_compute_attributes(
    State(store): State<Shared>,
    Path((cr, cp)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Reply {
    let mut store = lock(&store);
    let path = format!("compute_resources/{}/compute_profiles/{}/compute_attributes", cr, cp);
    log(&mut store, "GET", path, query.clone(), None);
    if !authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Unable to authenticate user");
    }
    let scope = [("compute_resource_id", cr.as_str()), ("compute_profile_id", cp.as_str())];
    reply(
        StatusCode::OK,
        index(&store, Resource::ComputeAttributes.path(), &query, &scope),
    )
}

async fn create(
    State(store): State<Shared>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut store = lock(&store);
    log(&mut store, "POST", collection.clone(), HashMap::new(), Some(body.clone()));
    if !authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Unable to authenticate user");
    }
    create_in(&mut store, &collection, &body, &[])
}

async fn create_compute_attribute(
    State(store): State<Shared>,
    Path((cr, cp)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut store = lock(&store);
    let path = format!("compute_resources/{}/compute_profiles/{}/compute_attributes", cr, cp);
    log(&mut store, "POST", path, HashMap::new(), Some(body.clone()));
    if !authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Unable to authenticate user");
    }
    let scope = [("compute_resource_id", cr.as_str()), ("compute_profile_id", cp.as_str())];
    create_in(&mut store, Resource::ComputeAttributes.path(), &body, &scope)
}

async fn show(
    State(store): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Reply {
    let mut store = lock(&store);
    log(&mut store, "GET", format!("{}/{}", collection, id), HashMap::new(), None);
    if !authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Unable to authenticate user");
    }
    match store.position(&collection, &id) {
        Some(index) => {
            let record = store.collections[&collection][index].clone();
            reply(StatusCode::OK, Value::Object(store.expand(record)))
        }
        None => message(StatusCode::NOT_FOUND, "Resource not found"),
    }
}

async fn update(
    State(store): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut store = lock(&store);
    log(&mut store, "PUT", format!("{}/{}", collection, id), HashMap::new(), Some(body.clone()));
    if !authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Unable to authenticate user");
    }
    let Some(index) = store.position(&collection, &id) else {
        return message(StatusCode::NOT_FOUND, "Resource not found");
    };
    let Some(changes) = element(&body) else {
        return message(StatusCode::UNPROCESSABLE_ENTITY, "Body must wrap one element");
    };
    if let Some(field) = store
        .locked
        .get(&collection)
        .and_then(|locked| locked.iter().find(|f| changes.contains_key(f.as_str())))
    {
        let text = format!("{} is not allowed as nested parameter for {}", field, collection);
        return message(StatusCode::UNPROCESSABLE_ENTITY, &text);
    }

    let updated = match store.collections.get_mut(&collection) {
        Some(records) => {
            let stored = &mut records[index];
            for (key, value) in changes {
                if key != "id" {
                    stored.insert(key, value);
                }
            }
            stored.clone()
        }
        None => return message(StatusCode::NOT_FOUND, "Resource not found"),
    };
    reply(StatusCode::OK, Value::Object(store.expand(updated)))
}

async fn destroy(
    State(store): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Reply {
    let mut store = lock(&store);
    log(&mut store, "DELETE", format!("{}/{}", collection, id), HashMap::new(), None);
    if !authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Unable to authenticate user");
    }
    let Some(index) = store.position(&collection, &id) else {
        return message(StatusCode::NOT_FOUND, "Resource not found");
    };
    match store.collections.get_mut(&collection) {
        Some(records) => reply(StatusCode::OK, Value::Object(records.remove(index))),
        None => message(StatusCode::NOT_FOUND, "Resource not found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_terms() {
        assert_eq!(
            search_terms(r#"name="example.com" and title="a \"b\"""#),
            vec![
                ("name".to_string(), "example.com".to_string()),
                ("title".to_string(), "a \"b\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_matches_numbers_as_text() {
        let record = json!({"id": 3, "name": "web"}).as_object().cloned().unwrap();
        assert!(matches_terms(&record, &[("id".to_string(), "3".to_string())]));
        assert!(!matches_terms(&record, &[("name".to_string(), "db".to_string())]));
    }

    #[test]
    fn test_element_requires_single_wrapper() {
        assert!(element(&json!({"domain": {"name": "a"}})).is_some());
        assert!(element(&json!({"name": "a", "fullname": "b"})).is_none());
    }
}
