use serde::Deserialize;

use super::KindParams;
use crate::desired::DesiredState;
use crate::error::Result;
use crate::intent::LifecycleIntent;

/// Parameters of the `domain` kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainParams {
    pub name: String,
    pub fullname: Option<String>,
    #[serde(default)]
    pub state: LifecycleIntent,
}

impl KindParams for DomainParams {
    fn into_desired(self) -> Result<DesiredState> {
        Ok(DesiredState::new(self.state)
            .with_field("name", self.name)
            .with_optional_field("fullname", self.fullname))
    }
}
