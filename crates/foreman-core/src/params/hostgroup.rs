use serde::Deserialize;

use super::KindParams;
use crate::desired::DesiredState;
use crate::error::Result;
use crate::intent::LifecycleIntent;

/// Parameters of the `hostgroup` kind. Every dependency is given by name.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostgroupParams {
    pub name: String,
    pub architecture: Option<String>,
    pub compute_profile: Option<String>,
    pub domain: Option<String>,
    pub environment: Option<String>,
    pub medium: Option<String>,
    pub operatingsystem: Option<String>,
    pub partition_table: Option<String>,
    pub smart_proxy: Option<String>,
    pub subnet: Option<String>,
    pub location: Option<String>,
    pub organization: Option<String>,
    #[serde(default)]
    pub state: LifecycleIntent,
}

impl KindParams for HostgroupParams {
    fn into_desired(self) -> Result<DesiredState> {
        Ok(DesiredState::new(self.state)
            .with_field("name", self.name)
            .with_reference("architecture", self.architecture)
            .with_reference("compute_profile", self.compute_profile)
            .with_reference("domain", self.domain)
            .with_reference("environment", self.environment)
            .with_reference("medium", self.medium)
            .with_reference("operatingsystem", self.operatingsystem)
            .with_reference("partition_table", self.partition_table)
            .with_reference("smart_proxy", self.smart_proxy)
            .with_reference("subnet", self.subnet)
            .with_reference("location", self.location)
            .with_reference("organization", self.organization))
    }
}
