use serde::Deserialize;
use serde_json::Value;

use super::{KindParams, optional_flag};
use crate::desired::DesiredState;
use crate::error::{Error, Result};
use crate::intent::LifecycleIntent;

fn default_auth_source() -> Option<String> {
    Some("Internal".to_string())
}

/// Parameters of the `user` kind.
///
/// `roles` items are role names, or objects used verbatim as the role
/// search filter. Leaving `roles` out leaves the user's roles unmanaged;
/// an empty list removes every role.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserParams {
    #[serde(alias = "name")]
    pub login: String,
    #[serde(default, deserialize_with = "optional_flag")]
    pub admin: Option<bool>,
    #[serde(alias = "auth", default = "default_auth_source")]
    pub auth_source_name: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub mail: Option<String>,
    pub password: Option<String>,
    pub roles: Option<Vec<Value>>,
    #[serde(default)]
    pub state: LifecycleIntent,
}

impl KindParams for UserParams {
    fn into_desired(self) -> Result<DesiredState> {
        if let Some(roles) = &self.roles
            && let Some(bad) = roles
                .iter()
                .find(|role| !(role.is_string() || role.is_object()))
        {
            return Err(Error::configuration(format!(
                "roles items must be names or search filters, got {}",
                bad
            )));
        }

        Ok(DesiredState::new(self.state)
            .with_field("login", self.login)
            .with_optional_field("admin", self.admin)
            .with_optional_field("auth_source_name", self.auth_source_name)
            .with_optional_field("firstname", self.firstname)
            .with_optional_field("lastname", self.lastname)
            .with_optional_field("mail", self.mail)
            .with_optional_field("password", self.password)
            .with_collection("roles", self.roles))
    }
}
