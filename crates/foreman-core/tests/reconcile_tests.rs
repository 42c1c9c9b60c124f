//! Tests for reconciliation driven through the kind registry

use foreman_api::{Operation, Record, Resource};
use foreman_core::{Action, Error, KindRegistry, Outcome, Reconciler};
use foreman_test_utils::FakeForeman;
use serde_json::{Value, json};

fn reconcile(fake: &FakeForeman, kind: &str, params: Value) -> Result<Outcome, Error> {
    let registry = KindRegistry::with_builtins();
    let entry = registry.get(kind).expect("kind should be registered");
    let params: Record = params.as_object().cloned().expect("params must be an object");
    let desired = entry.parse(params)?;
    Reconciler::new(fake).reconcile(entry.spec(), &desired)
}

fn user_fake() -> FakeForeman {
    FakeForeman::new().with_collection_link(Resource::Users, "role_ids", "roles", Resource::Roles)
}

mod domain_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_example_domain() {
        let fake = FakeForeman::new();

        let outcome = reconcile(
            &fake,
            "domain",
            json!({"name": "example.com", "fullname": "Example domain"}),
        )
        .unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.record.get("name"), Some(&json!("example.com")));
        assert_eq!(outcome.record.get("fullname"), Some(&json!("Example domain")));
        assert!(outcome.record.get("id").is_some());
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let fake = FakeForeman::new();
        let params = json!({"name": "example.com", "fullname": "Example domain"});

        assert!(reconcile(&fake, "domain", params.clone()).unwrap().changed);
        let second = reconcile(&fake, "domain", params).unwrap();

        assert!(!second.changed);
        assert_eq!(fake.mutating_calls().len(), 1);
    }

    #[test]
    fn test_undeclared_fullname_is_not_compared() {
        let fake = FakeForeman::new();
        fake.seed(Resource::Domains, json!({"name": "example.com", "fullname": "Kept"}));

        let outcome = reconcile(&fake, "domain", json!({"name": "example.com"})).unwrap();

        assert!(!outcome.changed);
    }

    #[test]
    fn test_delete_then_absent_is_noop() {
        let fake = FakeForeman::new();
        fake.seed(Resource::Domains, json!({"name": "example.com"}));
        let params = json!({"name": "example.com", "state": "absent"});

        let first = reconcile(&fake, "domain", params.clone()).unwrap();
        assert_eq!(first.action, Action::Delete);

        let second = reconcile(&fake, "domain", params).unwrap();
        assert!(!second.changed);
        assert_eq!(fake.calls_of(Operation::Delete), vec![Resource::Domains]);
    }

    #[test]
    fn test_invalid_state_fails_before_remote_calls() {
        let fake = FakeForeman::new();

        let err = reconcile(&fake, "domain", json!({"name": "a", "state": "Present"})).unwrap_err();

        assert!(matches!(err, Error::Configuration { .. }));
        assert!(fake.calls().is_empty());
    }
}

mod user_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_user_sends_role_ids() {
        let fake = user_fake();
        fake.seed(Resource::Roles, json!({"name": "Viewer"}));
        fake.seed(Resource::Roles, json!({"name": "Manager"}));

        let outcome = reconcile(
            &fake,
            "user",
            json!({"login": "jdoe", "password": "secret", "roles": ["Manager", "Viewer"]}),
        )
        .unwrap();

        assert!(outcome.changed);
        let created = &fake.payloads(Operation::Create)[0];
        assert_eq!(created.get("role_ids"), Some(&json!([2, 1])));
        assert_eq!(created.get("password"), Some(&json!("secret")));
        assert!(!created.contains_key("roles"));
    }

    #[test]
    fn test_role_order_does_not_matter() {
        let fake = user_fake();
        fake.seed(Resource::Roles, json!({"name": "Viewer"}));
        fake.seed(Resource::Roles, json!({"name": "Manager"}));
        fake.seed(
            Resource::Users,
            json!({"login": "jdoe", "auth_source_name": "Internal", "role_ids": [1, 2]}),
        );

        let outcome = reconcile(
            &fake,
            "user",
            json!({"login": "jdoe", "roles": ["Manager", "Viewer"]}),
        )
        .unwrap();

        assert!(!outcome.changed);
    }

    #[test]
    fn test_missing_role_triggers_update() {
        let fake = user_fake();
        fake.seed(Resource::Roles, json!({"name": "Viewer"}));
        fake.seed(Resource::Roles, json!({"name": "Manager"}));
        fake.seed(
            Resource::Users,
            json!({"login": "jdoe", "auth_source_name": "Internal", "role_ids": [1]}),
        );

        let outcome = reconcile(
            &fake,
            "user",
            json!({"login": "jdoe", "roles": ["Viewer", "Manager"]}),
        )
        .unwrap();

        assert_eq!(outcome.action, Action::Update);
        assert_eq!(outcome.changes[0].field, "roles");
        let sent = &fake.payloads(Operation::Update)[0];
        assert_eq!(sent.get("role_ids"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_password_does_not_cause_perpetual_updates() {
        let fake = user_fake();
        let params = json!({"login": "jdoe", "mail": "jdoe@example.com", "password": "secret"});

        assert!(reconcile(&fake, "user", params.clone()).unwrap().changed);
        assert!(!reconcile(&fake, "user", params).unwrap().changed);
    }

    #[test]
    fn test_unknown_role_aborts_without_mutation() {
        let fake = user_fake();
        fake.seed(Resource::Roles, json!({"name": "Viewer"}));

        let err =
            reconcile(&fake, "user", json!({"login": "jdoe", "roles": ["Auditor"]})).unwrap_err();

        assert!(matches!(err, Error::Resolution { .. }));
        assert!(fake.mutating_calls().is_empty());
    }
}

mod hostgroup_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seed_dependencies(fake: &FakeForeman) {
        fake.seed(Resource::Architectures, json!({"name": "x86_64"}));
        fake.seed(Resource::Domains, json!({"name": "example.com"}));
        fake.seed(Resource::Domains, json!({"name": "other.example.com"}));
        fake.seed(Resource::OperatingSystems, json!({"name": "CentOS", "title": "CentOS 7"}));
        fake.seed(Resource::Locations, json!({"name": "Berlin", "title": "EU/Berlin"}));
        fake.seed(Resource::Locations, json!({"name": "Paris", "title": "EU/Paris"}));
    }

    #[test]
    fn test_create_resolves_every_reference() {
        let fake = FakeForeman::new();
        seed_dependencies(&fake);

        reconcile(
            &fake,
            "hostgroup",
            json!({
                "name": "web",
                "architecture": "x86_64",
                "domain": "example.com",
                "operatingsystem": "CentOS 7",
                "location": "EU/Berlin",
            }),
        )
        .unwrap();

        assert_eq!(
            Value::Object(fake.payloads(Operation::Create)[0].clone()),
            json!({
                "name": "web",
                "architecture_id": 1,
                "domain_id": 1,
                "operatingsystem_id": 1,
                "location_id": 1,
            })
        );
    }

    #[test]
    fn test_non_updatable_change_is_ignored() {
        let fake = FakeForeman::new();
        seed_dependencies(&fake);
        fake.seed(Resource::Hostgroups, json!({"name": "web", "domain_id": 1}));

        let outcome = reconcile(
            &fake,
            "hostgroup",
            json!({"name": "web", "domain": "other.example.com"}),
        )
        .unwrap();

        assert!(!outcome.changed);
    }

    #[test]
    fn test_update_payload_excludes_non_updatable_fields() {
        let fake = FakeForeman::new();
        seed_dependencies(&fake);
        fake.seed(
            Resource::Hostgroups,
            json!({"name": "web", "domain_id": 1, "architecture_id": 1, "location_id": 1}),
        );

        let outcome = reconcile(
            &fake,
            "hostgroup",
            json!({"name": "web", "domain": "other.example.com", "location": "Paris"}),
        )
        .unwrap();

        assert_eq!(outcome.action, Action::Update);
        let sent = &fake.payloads(Operation::Update)[0];
        assert_eq!(sent.get("location_id"), Some(&json!(2)));
        assert!(!sent.contains_key("domain_id"));
        assert!(!sent.contains_key("architecture_id"));
        assert!(!sent.contains_key("id"));
    }

    #[test]
    fn test_update_sends_new_smart_proxy() {
        let fake = FakeForeman::new();
        seed_dependencies(&fake);
        fake.seed(Resource::SmartProxies, json!({"name": "proxy-old.example.com"}));
        fake.seed(Resource::SmartProxies, json!({"name": "proxy-new.example.com"}));
        fake.seed(
            Resource::Hostgroups,
            json!({"name": "web", "puppet_proxy_id": 1, "location_id": 1}),
        );

        let outcome = reconcile(
            &fake,
            "hostgroup",
            json!({"name": "web", "smart_proxy": "proxy-new.example.com", "location": "Paris"}),
        )
        .unwrap();

        assert_eq!(outcome.action, Action::Update);
        let sent = &fake.payloads(Operation::Update)[0];
        assert_eq!(sent.get("puppet_proxy_id"), Some(&json!(2)));
        assert_eq!(sent.get("location_id"), Some(&json!(2)));
        assert_eq!(
            fake.records(Resource::Hostgroups)[0].get("puppet_proxy_id"),
            Some(&json!(2))
        );
    }

    #[test]
    fn test_unresolved_reference_aborts_without_mutation() {
        let fake = FakeForeman::new();
        seed_dependencies(&fake);

        let err = reconcile(&fake, "hostgroup", json!({"name": "web", "medium": "CentOS mirror"}))
            .unwrap_err();

        assert!(err.to_string().contains("CentOS mirror"), "{}", err);
        assert!(fake.mutating_calls().is_empty());
    }
}

mod compute_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compute_resource_update_changes_provider_fields() {
        let fake = FakeForeman::new();
        fake.seed(
            Resource::ComputeResources,
            json!({
                "name": "VMware",
                "provider": "Vmware",
                "server": "old.example.com",
                "user": "admin",
            }),
        );

        let outcome = reconcile(
            &fake,
            "compute_resource",
            json!({
                "name": "VMware",
                "provider": "VMware",
                "server": "new.example.com",
                "user": "admin",
                "password": "secret",
            }),
        )
        .unwrap();

        assert_eq!(outcome.action, Action::Update);
        let sent = &fake.payloads(Operation::Update)[0];
        assert_eq!(sent.get("server"), Some(&json!("new.example.com")));
        assert_eq!(sent.get("password"), Some(&json!("secret")));
        assert!(!sent.contains_key("provider"));
    }

    #[test]
    fn test_compute_attribute_subset_match() {
        let fake = FakeForeman::new();
        fake.seed(Resource::ComputeResources, json!({"name": "VMware"}));
        fake.seed(Resource::ComputeProfiles, json!({"name": "1-Small"}));
        fake.seed(
            Resource::ComputeAttributes,
            json!({
                "compute_resource_id": 1,
                "compute_profile_id": 1,
                "vm_attrs": {"cpus": 1, "memory_mb": 2048, "guest_id": "otherGuest"},
            }),
        );

        let outcome = reconcile(
            &fake,
            "compute_attribute",
            json!({
                "compute_resource": "VMware",
                "compute_profile": "1-Small",
                "vm_attributes": {"cpus": 1, "memory_mb": 2048},
            }),
        )
        .unwrap();

        assert!(!outcome.changed);
    }

    #[test]
    fn test_compute_attribute_create_carries_scope() {
        let fake = FakeForeman::new();
        fake.seed(Resource::ComputeResources, json!({"name": "VMware"}));
        fake.seed(Resource::ComputeProfiles, json!({"name": "1-Small"}));

        reconcile(
            &fake,
            "compute_attribute",
            json!({
                "compute_resource": "VMware",
                "compute_profile": "1-Small",
                "vm_attributes": {"cpus": 2},
            }),
        )
        .unwrap();

        let created = &fake.payloads(Operation::Create)[0];
        assert_eq!(created.get("compute_resource_id"), Some(&json!(1)));
        assert_eq!(created.get("compute_profile_id"), Some(&json!(1)));
    }
}
