//! Built-in kinds - SINGLE SOURCE OF TRUTH
//!
//! Field partitions here are dictated by what the Foreman API accepts on
//! update; they must not be relaxed.

use foreman_api::Resource;

use super::store::KindEntry;
use super::types::{CollectionSpec, FieldMatch, KindSpec, ReferenceSpec};
use crate::params;

/// Number of built-in kinds.
pub const BUILTIN_COUNT: usize = 5;

pub static DOMAIN: KindSpec = KindSpec {
    name: "domain",
    resource: Resource::Domains,
    natural_key: &["name"],
    references: &[],
    collections: &[],
    updatable: None,
    non_updatable: &[],
    write_only: &[],
    matchers: &[],
    fetch_detail: false,
    supports_absent: true,
};

/// Foreman does not return passwords, and only the detail view of a user
/// carries its roles.
pub static USER: KindSpec = KindSpec {
    name: "user",
    resource: Resource::Users,
    natural_key: &["login"],
    references: &[],
    collections: &[CollectionSpec {
        param: "roles",
        resource: Resource::Roles,
        key: "name",
        payload_ids: Some("role_ids"),
    }],
    updatable: None,
    non_updatable: &[],
    write_only: &["password"],
    matchers: &[],
    fetch_detail: true,
    supports_absent: true,
};

/// Changing any of the non-updatable keys fails with "<key> is not allowed
/// as nested parameter for hostgroups".
pub static HOSTGROUP: KindSpec = KindSpec {
    name: "hostgroup",
    resource: Resource::Hostgroups,
    natural_key: &["name"],
    references: &[
        ReferenceSpec {
            param: "architecture",
            resource: Resource::Architectures,
            id_field: "architecture_id",
            search_title: false,
        },
        ReferenceSpec {
            param: "compute_profile",
            resource: Resource::ComputeProfiles,
            id_field: "compute_profile_id",
            search_title: false,
        },
        ReferenceSpec {
            param: "domain",
            resource: Resource::Domains,
            id_field: "domain_id",
            search_title: false,
        },
        ReferenceSpec {
            param: "environment",
            resource: Resource::Environments,
            id_field: "environment_id",
            search_title: false,
        },
        ReferenceSpec {
            param: "medium",
            resource: Resource::Media,
            id_field: "medium_id",
            search_title: false,
        },
        ReferenceSpec {
            param: "operatingsystem",
            resource: Resource::OperatingSystems,
            id_field: "operatingsystem_id",
            search_title: true,
        },
        ReferenceSpec {
            param: "partition_table",
            resource: Resource::PartitionTables,
            id_field: "ptable_id",
            search_title: false,
        },
        ReferenceSpec {
            param: "smart_proxy",
            resource: Resource::SmartProxies,
            id_field: "puppet_proxy_id",
            search_title: false,
        },
        ReferenceSpec {
            param: "subnet",
            resource: Resource::Subnets,
            id_field: "subnet_id",
            search_title: false,
        },
        ReferenceSpec {
            param: "location",
            resource: Resource::Locations,
            id_field: "location_id",
            search_title: true,
        },
        ReferenceSpec {
            param: "organization",
            resource: Resource::Organizations,
            id_field: "organization_id",
            search_title: true,
        },
    ],
    collections: &[],
    updatable: Some(&["puppetclass_id", "location_id", "organization_id"]),
    non_updatable: &[
        "architecture_id",
        "compute_profile_id",
        "domain_id",
        "environment_id",
        "medium_id",
        "operatingsystem_id",
        "subnet_id",
        "ptable_id",
        "smart_proxy_id",
    ],
    write_only: &[],
    matchers: &[],
    fetch_detail: false,
    supports_absent: true,
};

/// Provider-specific fields are declared per provider; see
/// [`provider_params`].
pub static COMPUTE_RESOURCE: KindSpec = KindSpec {
    name: "compute_resource",
    resource: Resource::ComputeResources,
    natural_key: &["name"],
    references: &[],
    collections: &[],
    updatable: None,
    non_updatable: &["provider"],
    write_only: &["password"],
    matchers: &[],
    fetch_detail: false,
    supports_absent: true,
};

/// Foreman exposes no delete for compute attributes, and returns more
/// `vm_attrs` keys than were declared.
pub static COMPUTE_ATTRIBUTE: KindSpec = KindSpec {
    name: "compute_attribute",
    resource: Resource::ComputeAttributes,
    natural_key: &["compute_resource_id", "compute_profile_id"],
    references: &[
        ReferenceSpec {
            param: "compute_resource",
            resource: Resource::ComputeResources,
            id_field: "compute_resource_id",
            search_title: false,
        },
        ReferenceSpec {
            param: "compute_profile",
            resource: Resource::ComputeProfiles,
            id_field: "compute_profile_id",
            search_title: false,
        },
    ],
    collections: &[],
    updatable: Some(&["vm_attrs"]),
    non_updatable: &[],
    write_only: &[],
    matchers: &[("vm_attrs", FieldMatch::Subset)],
    fetch_detail: false,
    supports_absent: false,
};

const DOCKER_PARAMS: &[&str] = &["password", "url", "user"];
const EC2_PARAMS: &[&str] = &["access_key", "password", "region", "url", "user"];
const GOOGLE_PARAMS: &[&str] = &["email", "key_path", "project", "url", "zone"];
const LIBVIRT_PARAMS: &[&str] = &["display_type", "url"];
const OVIRT_PARAMS: &[&str] = &["url", "user", "password"];
const OPENSTACK_PARAMS: &[&str] = &["url", "user", "password", "tenant"];
const VMWARE_PARAMS: &[&str] = &["datacenter", "user", "password", "server"];

/// Fields accepted for a compute resource provider (case-insensitive).
///
/// Returns `None` for providers Foreman does not know.
pub fn provider_params(provider: &str) -> Option<&'static [&'static str]> {
    match provider.to_lowercase().as_str() {
        "docker" => Some(DOCKER_PARAMS),
        "ec2" => Some(EC2_PARAMS),
        "google" => Some(GOOGLE_PARAMS),
        "libvirt" => Some(LIBVIRT_PARAMS),
        "ovirt" => Some(OVIRT_PARAMS),
        "openstack" => Some(OPENSTACK_PARAMS),
        "vmware" => Some(VMWARE_PARAMS),
        _ => None,
    }
}

/// Returns all built-in kind entries.
pub fn builtin_entries() -> Vec<KindEntry> {
    vec![
        KindEntry::new(&COMPUTE_ATTRIBUTE, params::parse::<params::ComputeAttributeParams>),
        KindEntry::new(&COMPUTE_RESOURCE, params::parse::<params::ComputeResourceParams>),
        KindEntry::new(&DOMAIN, params::parse::<params::DomainParams>),
        KindEntry::new(&HOSTGROUP, params::parse::<params::HostgroupParams>),
        KindEntry::new(&USER, params::parse::<params::UserParams>),
    ]
}
