//! `tableau_user` resource.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{decode_state, diff_attributes, require_id};
use crate::client::{Client, User};
use crate::error::ProviderError;
use crate::roles::{AuthSetting, SiteRole};
use crate::schema::{Attribute, Schema};
use crate::types::AttributeChange;

/// Resource type name.
pub const RESOURCE_TYPE: &str = "tableau_user";

/// Attributes sent by the update endpoint. A change to any of them
/// triggers a remote update.
const UPDATABLE: [&str; 4] = ["full_name", "email", "site_role", "auth_setting"];

const ALL_ATTRIBUTES: [&str; 5] = ["email", "name", "full_name", "site_role", "auth_setting"];

/// State of a managed user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserModel {
    /// Remote identifier; `None` before creation or once the user is gone.
    #[serde(default)]
    pub id: Option<String>,
    /// Email address.
    pub email: String,
    /// Sign-in name.
    pub name: String,
    /// Display name.
    pub full_name: String,
    /// Site role.
    pub site_role: SiteRole,
    /// Authentication mechanism.
    pub auth_setting: AuthSetting,
}

impl UserModel {
    /// Schema of the resource.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "id",
                Attribute::computed_string().with_description("User identifier"),
            )
            .with_attribute(
                "email",
                Attribute::required_string().with_description("User email"),
            )
            .with_attribute(
                "name",
                Attribute::required_string().with_description("User name"),
            )
            .with_attribute(
                "full_name",
                Attribute::required_string().with_description("Display name for user"),
            )
            .with_attribute(
                "site_role",
                Attribute::required_string()
                    .with_description("Site role for the user")
                    .with_allowed_values(SiteRole::names()),
            )
            .with_attribute(
                "auth_setting",
                Attribute::required_string()
                    .with_description("Auth setting for the user")
                    .with_allowed_values(AuthSetting::names()),
            )
    }

    /// Validate and decode JSON state.
    pub fn from_state(state: &Value) -> Result<Self, ProviderError> {
        decode_state(&Self::schema(), state)
    }

    /// Encode as JSON state.
    pub fn to_state(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "email": self.email,
            "name": self.name,
            "full_name": self.full_name,
            "site_role": self.site_role,
            "auth_setting": self.auth_setting,
        })
    }

    /// Build state from a fetched user. `id` is the key the user was fetched by.
    pub fn from_user(id: &str, user: User) -> Self {
        Self {
            id: Some(user.id.unwrap_or_else(|| id.to_string())),
            email: user.email,
            name: user.name,
            full_name: user.full_name,
            site_role: user.site_role,
            auth_setting: user.auth_setting,
        }
    }

    /// Whether moving from `self` to `planned` needs an update call.
    pub fn needs_remote_update(&self, planned: &UserModel) -> bool {
        !diff_attributes(&self.to_state(), &planned.to_state(), &UPDATABLE).is_empty()
    }

    /// Attribute-level changes from `prior` (None on create) to `self`.
    pub fn changes_from(&self, prior: Option<&UserModel>) -> Vec<AttributeChange> {
        let planned = self.to_state();
        match prior {
            Some(prior) => diff_attributes(&prior.to_state(), &planned, &ALL_ATTRIBUTES),
            None => diff_attributes(&Value::Null, &planned, &ALL_ATTRIBUTES),
        }
    }
}

/// Create the user, fill in the attributes the create endpoint does not
/// accept, then refresh from the server.
#[instrument(skip(client, planned), fields(name = %planned.name))]
pub async fn create(client: &Client, planned: &UserModel) -> Result<UserModel, ProviderError> {
    let created = client
        .create_user(&planned.name, planned.site_role, planned.auth_setting)
        .await?;
    let id = created.id.ok_or_else(|| {
        ProviderError::InvalidRequest("create user response carried no id".to_string())
    })?;
    info!(user_id = %id, "User created");

    client
        .update_user(
            &id,
            &planned.full_name,
            &planned.email,
            planned.site_role,
            planned.auth_setting,
        )
        .await?;

    read(client, &id)
        .await?
        .ok_or_else(|| ProviderError::NotFound(format!("user ID {} vanished after create", id)))
}

/// Fetch the user. `Ok(None)` means it no longer exists.
#[instrument(skip(client))]
pub async fn read(client: &Client, user_id: &str) -> Result<Option<UserModel>, ProviderError> {
    match client.get_user(user_id).await {
        Ok(user) => Ok(Some(UserModel::from_user(user_id, user))),
        Err(e) if e.is_not_found() => {
            warn!(user_id, "User no longer exists, dropping from state");
            Ok(None)
        },
        Err(e) => Err(e),
    }
}

/// Push changed attributes, then refresh from the server.
#[instrument(skip(client, prior, planned))]
pub async fn update(
    client: &Client,
    prior: &UserModel,
    planned: &UserModel,
) -> Result<Option<UserModel>, ProviderError> {
    let id = require_id(prior.id.as_deref(), RESOURCE_TYPE)?;

    if prior.needs_remote_update(planned) {
        client
            .update_user(
                id,
                &planned.full_name,
                &planned.email,
                planned.site_role,
                planned.auth_setting,
            )
            .await?;
        info!(user_id = %id, "User updated");
    } else {
        debug!(user_id = %id, "No updatable attribute changed, refreshing only");
    }

    read(client, id).await
}

/// Remove the user from the site.
#[instrument(skip(client))]
pub async fn delete(client: &Client, user_id: &str) -> Result<(), ProviderError> {
    client.delete_user(user_id).await?;
    info!(user_id, "User deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> UserModel {
        UserModel {
            id: Some("u-1".to_string()),
            email: "jane@example.com".to_string(),
            name: "jane".to_string(),
            full_name: "Jane Doe".to_string(),
            site_role: SiteRole::Explorer,
            auth_setting: AuthSetting::ServerDefault,
        }
    }

    #[test]
    fn test_state_round_trip() {
        let state = model().to_state();
        assert_eq!(state["site_role"], "Explorer");
        assert_eq!(state["auth_setting"], "ServerDefault");
        assert_eq!(UserModel::from_state(&state).unwrap(), model());
    }

    #[test]
    fn test_from_state_rejects_unknown_enums() {
        let mut state = model().to_state();
        state["site_role"] = json!("SuperUser");
        let err = UserModel::from_state(&state).unwrap_err();
        assert!(matches!(err, ProviderError::Validation(ref msg) if msg.contains("site_role")));

        let mut state = model().to_state();
        state["auth_setting"] = json!("Kerberos");
        assert!(matches!(
            UserModel::from_state(&state),
            Err(ProviderError::Validation(_))
        ));
    }

    #[test]
    fn test_from_state_without_id() {
        let state = json!({
            "email": "a@x", "name": "a", "full_name": "A",
            "site_role": "Viewer", "auth_setting": "OpenID"
        });
        let model = UserModel::from_state(&state).unwrap();
        assert!(model.id.is_none());
        assert_eq!(model.auth_setting, AuthSetting::OpenId);
    }

    #[test]
    fn test_needs_remote_update() {
        let prior = model();
        assert!(!prior.needs_remote_update(&prior.clone()));

        // The sign-in name is not sent by the update endpoint.
        let mut renamed = prior.clone();
        renamed.name = "janed".to_string();
        assert!(!prior.needs_remote_update(&renamed));

        let mut planned = prior.clone();
        planned.full_name = "J. Doe".to_string();
        assert!(prior.needs_remote_update(&planned));

        let mut planned = prior.clone();
        planned.email = "j@example.com".to_string();
        assert!(prior.needs_remote_update(&planned));

        let mut planned = prior.clone();
        planned.site_role = SiteRole::Creator;
        assert!(prior.needs_remote_update(&planned));

        let mut planned = prior.clone();
        planned.auth_setting = AuthSetting::Saml;
        assert!(prior.needs_remote_update(&planned));
    }

    #[test]
    fn test_changes_from() {
        let created = model().changes_from(None);
        assert_eq!(created.len(), 5);
        assert!(created.iter().all(|c| c.before.is_none()));

        let prior = model();
        let mut planned = prior.clone();
        planned.site_role = SiteRole::Viewer;
        let changes = planned.changes_from(Some(&prior));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "site_role");
    }
}
