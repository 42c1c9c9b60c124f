//! Playbook scenarios
//!
//! Each scenario runs a sequence of reconciliations against one in-memory
//! Foreman, the way a configuration run would apply several tasks in order.

use foreman_api::{Operation, Record, Resource};
use foreman_core::{Action, Error, KindRegistry, Outcome, ReconcileOptions, Reconciler};
use foreman_test_utils::FakeForeman;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// An ordered list of `(kind, params)` tasks.
struct Playbook {
    tasks: Vec<(&'static str, Value)>,
}

impl Playbook {
    fn new(tasks: Vec<(&'static str, Value)>) -> Self {
        Self { tasks }
    }

    /// Run every task, stopping at the first failure.
    fn run(&self, fake: &FakeForeman, options: ReconcileOptions) -> Result<Vec<Outcome>, Error> {
        let registry = KindRegistry::with_builtins();
        let reconciler = Reconciler::new(fake).with_options(options);

        self.tasks
            .iter()
            .map(|(kind, params)| {
                let entry = registry.get(kind).expect("kind should be registered");
                let params: Record = params.as_object().cloned().expect("params are an object");
                let desired = entry.parse(params)?;
                reconciler.reconcile(entry.spec(), &desired)
            })
            .collect()
    }

    /// Same tasks with `state` replaced, in reverse order.
    fn teardown(&self) -> Self {
        let tasks = self
            .tasks
            .iter()
            .rev()
            .filter(|(kind, _)| *kind != "compute_attribute")
            .map(|(kind, params)| {
                let mut params = params.clone();
                params["state"] = json!("absent");
                (*kind, params)
            })
            .collect();
        Self { tasks }
    }
}

/// A Foreman with the dependencies hostgroups and users refer to.
fn seeded_foreman() -> FakeForeman {
    let fake = FakeForeman::new().with_collection_link(
        Resource::Users,
        "role_ids",
        "roles",
        Resource::Roles,
    );
    fake.seed(Resource::Architectures, json!({"name": "x86_64"}));
    fake.seed(Resource::OperatingSystems, json!({"name": "CentOS", "title": "CentOS 7"}));
    fake.seed(Resource::Media, json!({"name": "CentOS mirror"}));
    fake.seed(Resource::PartitionTables, json!({"name": "Kickstart default"}));
    fake.seed(Resource::SmartProxies, json!({"name": "proxy01.example.com"}));
    fake.seed(Resource::Environments, json!({"name": "production"}));
    fake.seed(Resource::Locations, json!({"name": "Berlin", "title": "EU/Berlin"}));
    fake.seed(Resource::Organizations, json!({"name": "ACME", "title": "ACME"}));
    fake.seed(Resource::ComputeProfiles, json!({"name": "1-Small"}));
    fake.seed(Resource::Roles, json!({"name": "Viewer"}));
    fake.seed(Resource::Roles, json!({"name": "Manager"}));
    fake
}

fn provisioning() -> Playbook {
    Playbook::new(vec![
        (
            "compute_resource",
            json!({
                "name": "VMware",
                "provider": "VMware",
                "datacenter": "dc01",
                "server": "vsphere.example.com",
                "user": "svc_foreman",
                "password": "secret",
            }),
        ),
        (
            "compute_attribute",
            json!({
                "compute_resource": "VMware",
                "compute_profile": "1-Small",
                "vm_attributes": {"cpus": 1, "memory_mb": 2048},
            }),
        ),
        (
            "domain",
            json!({"name": "example.com", "fullname": "Example domain"}),
        ),
        (
            "hostgroup",
            json!({
                "name": "web",
                "architecture": "x86_64",
                "domain": "example.com",
                "environment": "production",
                "medium": "CentOS mirror",
                "operatingsystem": "CentOS 7",
                "partition_table": "Kickstart default",
                "smart_proxy": "proxy01.example.com",
                "location": "EU/Berlin",
                "organization": "ACME",
            }),
        ),
        (
            "user",
            json!({
                "login": "jdoe",
                "firstname": "Jane",
                "lastname": "Doe",
                "mail": "jdoe@example.com",
                "password": "changeme",
                "roles": ["Viewer", "Manager"],
            }),
        ),
    ])
}

fn changed(outcomes: &[Outcome]) -> Vec<bool> {
    outcomes.iter().map(|o| o.changed).collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_provisioning_converges_in_one_run() {
    let fake = seeded_foreman();
    let playbook = provisioning();

    let first = playbook.run(&fake, ReconcileOptions::default()).unwrap();
    assert_eq!(changed(&first), vec![true; 5]);
    assert_eq!(fake.mutating_calls().len(), 5);

    let second = playbook.run(&fake, ReconcileOptions::default()).unwrap();
    assert_eq!(changed(&second), vec![false; 5]);
    assert_eq!(fake.mutating_calls().len(), 5, "second run must not mutate");
}

#[test]
fn test_hostgroup_is_created_with_resolved_ids() {
    let fake = seeded_foreman();
    provisioning().run(&fake, ReconcileOptions::default()).unwrap();

    let hostgroup = &fake.records(Resource::Hostgroups)[0];
    assert_eq!(hostgroup.get("puppet_proxy_id"), Some(&json!(1)));
    assert_eq!(hostgroup.get("ptable_id"), Some(&json!(1)));
    assert_eq!(hostgroup.get("operatingsystem_id"), Some(&json!(1)));
    assert!(!hostgroup.contains_key("smart_proxy"));
}

#[test]
fn test_check_mode_predicts_without_mutating() {
    let fake = seeded_foreman();
    // Tasks whose references exist before the run; nothing is created in
    // check mode, so later tasks could not resolve earlier ones.
    let playbook = Playbook::new(
        provisioning()
            .tasks
            .into_iter()
            .filter(|(kind, _)| matches!(*kind, "domain" | "user" | "compute_resource"))
            .collect(),
    );

    let predicted = playbook
        .run(&fake, ReconcileOptions { dry_run: true })
        .unwrap();

    assert_eq!(changed(&predicted), vec![true; 3]);
    assert!(predicted.iter().all(|o| o.action == Action::Create));
    assert!(fake.mutating_calls().is_empty());
    assert!(fake.records(Resource::Domains).is_empty());
}

#[test]
fn test_check_mode_after_drift_reports_update() {
    let fake = seeded_foreman();
    provisioning().run(&fake, ReconcileOptions::default()).unwrap();

    let drifted = Playbook::new(vec![(
        "domain",
        json!({"name": "example.com", "fullname": "Renamed"}),
    )]);
    let outcome = &drifted.run(&fake, ReconcileOptions { dry_run: true }).unwrap()[0];

    assert!(outcome.changed);
    assert_eq!(outcome.action, Action::Update);
    assert_eq!(outcome.changes[0].before, json!("Example domain"));
    assert_eq!(fake.records(Resource::Domains)[0].get("fullname"), Some(&json!("Example domain")));
}

#[test]
fn test_teardown_is_idempotent() {
    let fake = seeded_foreman();
    let playbook = provisioning();
    playbook.run(&fake, ReconcileOptions::default()).unwrap();

    let teardown = playbook.teardown();
    let first = teardown.run(&fake, ReconcileOptions::default()).unwrap();
    assert_eq!(changed(&first), vec![true; 4]);

    let second = teardown.run(&fake, ReconcileOptions::default()).unwrap();
    assert_eq!(changed(&second), vec![false; 4]);

    assert!(fake.records(Resource::Users).is_empty());
    assert!(fake.records(Resource::Hostgroups).is_empty());
    assert_eq!(fake.calls_of(Operation::Delete).len(), 4);
}

#[test]
fn test_teardown_does_not_need_hostgroup_dependencies() {
    let fake = seeded_foreman();
    fake.seed(Resource::Hostgroups, json!({"name": "legacy"}));

    let teardown = Playbook::new(vec![(
        "hostgroup",
        json!({"name": "legacy", "domain": "decommissioned.example.com", "state": "absent"}),
    )]);

    let outcome = &teardown.run(&fake, ReconcileOptions::default()).unwrap()[0];
    assert_eq!(outcome.action, Action::Delete);
}

#[test]
fn test_failure_stops_the_run_without_rollback() {
    let fake = seeded_foreman();
    let playbook = Playbook::new(vec![
        ("domain", json!({"name": "example.com"})),
        ("hostgroup", json!({"name": "web", "domain": "missing.example.com"})),
        ("user", json!({"login": "jdoe"})),
    ]);

    let err = playbook.run(&fake, ReconcileOptions::default()).unwrap_err();

    assert!(matches!(err, Error::Resolution { .. }));
    assert_eq!(fake.records(Resource::Domains).len(), 1, "earlier task is kept");
    assert!(fake.records(Resource::Users).is_empty(), "later task never ran");
}

#[test]
fn test_role_change_converges() {
    let fake = seeded_foreman();
    provisioning().run(&fake, ReconcileOptions::default()).unwrap();

    let demote = Playbook::new(vec![("user", json!({"login": "jdoe", "roles": ["Viewer"]}))]);

    let first = &demote.run(&fake, ReconcileOptions::default()).unwrap()[0];
    assert_eq!(first.action, Action::Update);
    assert_eq!(fake.records(Resource::Users)[0].get("role_ids"), Some(&json!([1])));

    let second = &demote.run(&fake, ReconcileOptions::default()).unwrap()[0];
    assert!(!second.changed);
}
