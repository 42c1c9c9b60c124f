//! Catalogue of Foreman API collections

use std::fmt;

use serde::{Deserialize, Serialize};

/// A collection exposed by the Foreman API v2.
///
/// Each variant knows its URL path segment (`/api/v2/<path>`) and the
/// element key Foreman expects as the JSON wrapper on create and update
/// (`{"domain": {...}}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Architectures,
    ComputeAttributes,
    ComputeProfiles,
    ComputeResources,
    Domains,
    Environments,
    Hostgroups,
    Locations,
    Media,
    OperatingSystems,
    Organizations,
    PartitionTables,
    Roles,
    SmartProxies,
    Subnets,
    Users,
}

impl Resource {
    /// URL path segment below `/api/v2`.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Architectures => "architectures",
            Resource::ComputeAttributes => "compute_attributes",
            Resource::ComputeProfiles => "compute_profiles",
            Resource::ComputeResources => "compute_resources",
            Resource::Domains => "domains",
            Resource::Environments => "environments",
            Resource::Hostgroups => "hostgroups",
            Resource::Locations => "locations",
            Resource::Media => "media",
            Resource::OperatingSystems => "operatingsystems",
            Resource::Organizations => "organizations",
            Resource::PartitionTables => "ptables",
            Resource::Roles => "roles",
            Resource::SmartProxies => "smart_proxies",
            Resource::Subnets => "subnets",
            Resource::Users => "users",
        }
    }

    /// JSON wrapper key for create/update payloads.
    pub fn element(&self) -> &'static str {
        match self {
            Resource::Architectures => "architecture",
            Resource::ComputeAttributes => "compute_attribute",
            Resource::ComputeProfiles => "compute_profile",
            Resource::ComputeResources => "compute_resource",
            Resource::Domains => "domain",
            Resource::Environments => "environment",
            Resource::Hostgroups => "hostgroup",
            Resource::Locations => "location",
            Resource::Media => "medium",
            Resource::OperatingSystems => "operatingsystem",
            Resource::Organizations => "organization",
            Resource::PartitionTables => "ptable",
            Resource::Roles => "role",
            Resource::SmartProxies => "smart_proxy",
            Resource::Subnets => "subnet",
            Resource::Users => "user",
        }
    }

    /// Fields that place this collection below a parent in the URL.
    ///
    /// Compute attributes only exist per (compute resource, compute profile)
    /// pair and are listed and created under
    /// `/compute_resources/{id}/compute_profiles/{id}/compute_attributes`.
    pub fn scope_fields(&self) -> &'static [&'static str] {
        match self {
            Resource::ComputeAttributes => &["compute_resource_id", "compute_profile_id"],
            _ => &[],
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}
