use foreman_api::Record;
use serde::Deserialize;
use serde_json::Value;

use super::KindParams;
use crate::desired::DesiredState;
use crate::error::Result;
use crate::intent::LifecycleIntent;

/// Parameters of the `compute_attribute` kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputeAttributeParams {
    pub compute_resource: String,
    pub compute_profile: String,
    #[serde(alias = "vm_attrs")]
    pub vm_attributes: Record,
    #[serde(default)]
    pub state: LifecycleIntent,
}

impl KindParams for ComputeAttributeParams {
    fn into_desired(self) -> Result<DesiredState> {
        Ok(DesiredState::new(self.state)
            .with_reference("compute_resource", Some(self.compute_resource))
            .with_reference("compute_profile", Some(self.compute_profile))
            .with_field("vm_attrs", Value::Object(self.vm_attributes)))
    }
}
