use std::collections::BTreeMap;

use serde::Deserialize;

use super::KindParams;
use crate::desired::DesiredState;
use crate::error::{Error, Result};
use crate::intent::LifecycleIntent;
use crate::kinds::provider_params;

/// Parameters of the `compute_resource` kind.
///
/// Which of the provider fields may be given depends on `provider`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputeResourceParams {
    pub name: String,
    pub provider: Option<String>,
    pub access_key: Option<String>,
    pub datacenter: Option<String>,
    pub display_type: Option<String>,
    pub email: Option<String>,
    pub key_path: Option<String>,
    pub password: Option<String>,
    pub project: Option<String>,
    pub region: Option<String>,
    pub server: Option<String>,
    pub tenant: Option<String>,
    pub url: Option<String>,
    pub user: Option<String>,
    pub zone: Option<String>,
    #[serde(default)]
    pub state: LifecycleIntent,
}

impl ComputeResourceParams {
    fn provider_fields(&self) -> BTreeMap<&'static str, &String> {
        [
            ("access_key", &self.access_key),
            ("datacenter", &self.datacenter),
            ("display_type", &self.display_type),
            ("email", &self.email),
            ("key_path", &self.key_path),
            ("password", &self.password),
            ("project", &self.project),
            ("region", &self.region),
            ("server", &self.server),
            ("tenant", &self.tenant),
            ("url", &self.url),
            ("user", &self.user),
            ("zone", &self.zone),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_ref().map(|v| (field, v)))
        .collect()
    }
}

impl KindParams for ComputeResourceParams {
    fn into_desired(self) -> Result<DesiredState> {
        let desired = DesiredState::new(self.state).with_field("name", self.name.clone());

        // Only the name matters for a delete.
        if self.state == LifecycleIntent::Absent {
            return Ok(desired);
        }

        let provider = self
            .provider
            .clone()
            .ok_or_else(|| Error::configuration("provider is required when state is present"))?;
        let accepted = provider_params(&provider)
            .ok_or_else(|| Error::configuration(format!("unknown provider: {}", provider)))?;

        let mut desired = desired.with_field("provider", provider.clone());
        for (field, value) in self.provider_fields() {
            if !accepted.contains(&field) {
                return Err(Error::configuration(format!(
                    "{} is not supported by provider {}",
                    field, provider
                )));
            }
            desired = desired.with_field(field, value.clone());
        }

        Ok(desired)
    }
}
