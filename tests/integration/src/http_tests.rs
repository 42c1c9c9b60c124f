//! HTTP client tests against a local Foreman look-alike
//!
//! These exercise the wire format: URLs, the search expression, element
//! wrapping, basic authentication and error bodies.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use foreman_api::{Connection, Error, ForemanApi, HttpForeman, Record, RecordId, Resource};
use foreman_core::{Action, KindRegistry, Reconciler};
use foreman_test_utils::ForemanServer;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn record(value: Value) -> Record {
    value.as_object().cloned().expect("record must be an object")
}

fn client(server: &ForemanServer) -> HttpForeman {
    HttpForeman::new(&server.connection()).expect("client should build")
}

#[test]
fn test_search_sends_scoped_search_expression() {
    let server = ForemanServer::start();
    server.seed(Resource::Domains, json!({"name": "example.com"}));
    server.seed(Resource::Domains, json!({"name": "other.example.com"}));

    let found = client(&server)
        .search(Resource::Domains, &record(json!({"name": "example.com"})))
        .unwrap()
        .expect("domain should be found");

    assert_eq!(found.get("id"), Some(&json!(1)));
    let request = &server.requests()[0];
    assert_eq!(request.path, "domains");
    assert_eq!(request.query.get("search").map(String::as_str), Some("name=\"example.com\""));
    assert_eq!(request.query.get("per_page").map(String::as_str), Some("100"));
}

#[test]
fn test_search_without_match_is_none() {
    let server = ForemanServer::start();

    let found = client(&server)
        .search(Resource::Architectures, &record(json!({"name": "sparc"})))
        .unwrap();

    assert!(found.is_none());
}

#[test]
fn test_create_wraps_payload_in_element_key() {
    let server = ForemanServer::start();

    let created = client(&server)
        .create(Resource::OperatingSystems, &record(json!({"name": "CentOS"})))
        .unwrap();

    assert_eq!(created.get("id"), Some(&json!(1)));
    let request = &server.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.body, Some(json!({"operatingsystem": {"name": "CentOS"}})));
}

#[test]
fn test_update_and_delete_use_member_urls() {
    let server = ForemanServer::start();
    let stored = server.seed(Resource::Domains, json!({"name": "example.com"}));
    let id = RecordId::of(&stored).unwrap();
    let api = client(&server);

    let updated = api
        .update(Resource::Domains, &id, &record(json!({"fullname": "Example"})))
        .unwrap();
    assert_eq!(updated.get("fullname"), Some(&json!("Example")));

    api.delete(Resource::Domains, &id).unwrap();

    assert_eq!(
        server.mutating_requests(),
        vec![("PUT", "domains/1".to_string()), ("DELETE", "domains/1".to_string())]
    );
    assert!(server.records(Resource::Domains).is_empty());
}

#[test]
fn test_compute_attributes_are_nested() {
    let server = ForemanServer::start();
    let api = client(&server);
    let scope = json!({"compute_resource_id": 3, "compute_profile_id": 7, "vm_attrs": {"cpus": 1}});

    api.create(Resource::ComputeAttributes, &record(scope)).unwrap();
    let found = api
        .search(
            Resource::ComputeAttributes,
            &record(json!({"compute_resource_id": 3, "compute_profile_id": 7})),
        )
        .unwrap();

    assert!(found.is_some());
    let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![
            "compute_resources/3/compute_profiles/7/compute_attributes".to_string(),
            "compute_resources/3/compute_profiles/7/compute_attributes".to_string(),
        ]
    );
    let body = server.requests()[0].body.clone().unwrap();
    assert_eq!(body, json!({"compute_attribute": {"vm_attrs": {"cpus": 1}}}));
}

#[test]
fn test_validation_error_carries_full_messages() {
    let server = ForemanServer::start();
    server.seed(Resource::Domains, json!({"name": "example.com"}));

    let err = client(&server)
        .create(Resource::Domains, &record(json!({"name": "example.com"})))
        .unwrap_err();

    match err {
        Error::Remote { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "name has already been taken");
        }
        other => panic!("expected a remote error, got {:?}", other),
    }
}

#[test]
fn test_not_found_carries_message() {
    let server = ForemanServer::start();

    let err = client(&server)
        .get(Resource::Users, &RecordId::from(42))
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP 404: Resource not found");
}

#[test]
fn test_unreachable_server_is_transport_error() {
    let connection = Connection::new("http://127.0.0.1", 1, "admin", "changeme");

    let err = HttpForeman::new(&connection)
        .unwrap()
        .search(Resource::Domains, &record(json!({"name": "example.com"})))
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}

#[test]
fn test_truncated_body_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let responder = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = [0u8; 4096];
        let _ = stream.read(&mut request);
        // Promises 64 bytes, sends a few, then hangs up
        let response = concat!(
            "HTTP/1.1 200 OK\r\n",
            "Content-Type: application/json\r\n",
            "Content-Length: 64\r\n\r\n",
            "{\"id\"",
        );
        stream.write_all(response.as_bytes()).unwrap();
    });
    let connection = Connection::new("http://127.0.0.1", port, "admin", "changeme");

    let err = HttpForeman::new(&connection)
        .unwrap()
        .get(Resource::Domains, &RecordId::from(1))
        .unwrap_err();

    responder.join().unwrap();
    assert!(matches!(err, Error::Transport(_)), "got {:?}", err);
}

#[test]
fn test_reconcile_user_over_http() {
    let server = ForemanServer::start();
    server.seed(Resource::Roles, json!({"name": "Viewer"}));
    server.seed(Resource::Roles, json!({"name": "Manager"}));
    let api = client(&server);
    let registry = KindRegistry::with_builtins();
    let entry = registry.get("user").unwrap();
    let params = record(json!({
        "login": "jdoe",
        "mail": "jdoe@example.com",
        "password": "changeme",
        "roles": ["Manager", "Viewer"],
    }));

    let desired = entry.parse(params).unwrap();
    let first = Reconciler::new(&api).reconcile(entry.spec(), &desired).unwrap();
    let second = Reconciler::new(&api).reconcile(entry.spec(), &desired).unwrap();

    assert_eq!(first.action, Action::Create);
    assert_eq!(second.action, Action::Noop);
    assert_eq!(server.records(Resource::Users)[0].get("role_ids"), Some(&json!([2, 1])));
    let detail_reads = server
        .requests()
        .into_iter()
        .filter(|r| r.method == "GET" && r.path == "users/1")
        .count();
    assert_eq!(detail_reads, 1);
}

#[test]
fn test_hostgroup_update_never_sends_locked_fields() {
    let server = ForemanServer::start();
    server.lock_fields(
        Resource::Hostgroups,
        &["architecture_id", "domain_id", "operatingsystem_id", "subnet_id"],
    );
    server.seed(Resource::Domains, json!({"name": "example.com"}));
    server.seed(Resource::Locations, json!({"name": "Berlin", "title": "Berlin"}));
    server.seed(Resource::Locations, json!({"name": "Paris", "title": "Paris"}));
    server.seed(
        Resource::Hostgroups,
        json!({"name": "web", "domain_id": 1, "location_id": 1}),
    );
    let api = client(&server);
    let registry = KindRegistry::with_builtins();
    let entry = registry.get("hostgroup").unwrap();
    let desired = entry
        .parse(record(json!({"name": "web", "domain": "example.com", "location": "Paris"})))
        .unwrap();

    let outcome = Reconciler::new(&api).reconcile(entry.spec(), &desired).unwrap();

    assert_eq!(outcome.action, Action::Update);
    assert_eq!(server.records(Resource::Hostgroups)[0].get("location_id"), Some(&json!(2)));
    assert_eq!(
        server
            .requests()
            .iter()
            .filter(|r| r.method == "PUT")
            .count(),
        1
    );
    assert_eq!(outcome.changes[0].field, "location_id");
}
