//! User endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::Client;
use crate::error::ProviderError;
use crate::roles::{AuthSetting, SiteRole};

/// A user as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned identifier. Absent from update responses.
    #[serde(default)]
    pub id: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Sign-in name.
    #[serde(default)]
    pub name: String,
    /// Display name.
    #[serde(default)]
    pub full_name: String,
    /// Site role.
    pub site_role: SiteRole,
    /// Authentication mechanism.
    pub auth_setting: AuthSetting,
}

#[derive(Serialize)]
struct UserRequest<T> {
    user: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewUser<'a> {
    name: &'a str,
    site_role: SiteRole,
    auth_setting: AuthSetting,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserUpdate<'a> {
    full_name: &'a str,
    email: &'a str,
    site_role: SiteRole,
    auth_setting: AuthSetting,
}

#[derive(Deserialize)]
struct UserResponse {
    user: User,
}

impl Client {
    /// Fetch a user by id.
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> Result<User, ProviderError> {
        let response: UserResponse = self.get_json(&format!("/users/{}", user_id)).await?;
        Ok(response.user)
    }

    /// Add a user to the site.
    ///
    /// The endpoint only takes the sign-in name, site role and auth setting;
    /// email and full name are set with [`Client::update_user`].
    #[instrument(skip(self))]
    pub async fn create_user(
        &self,
        name: &str,
        site_role: SiteRole,
        auth_setting: AuthSetting,
    ) -> Result<User, ProviderError> {
        let request = UserRequest {
            user: NewUser {
                name,
                site_role,
                auth_setting,
            },
        };
        let response: UserResponse = self.send_json(Method::POST, "/users", &request).await?;
        Ok(response.user)
    }

    /// Update the mutable attributes of a user.
    #[instrument(skip(self))]
    pub async fn update_user(
        &self,
        user_id: &str,
        full_name: &str,
        email: &str,
        site_role: SiteRole,
        auth_setting: AuthSetting,
    ) -> Result<User, ProviderError> {
        let request = UserRequest {
            user: UserUpdate {
                full_name,
                email,
                site_role,
                auth_setting,
            },
        };
        let response: UserResponse = self
            .send_json(Method::PUT, &format!("/users/{}", user_id), &request)
            .await?;
        Ok(response.user)
    }

    /// Remove a user from the site.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: &str) -> Result<(), ProviderError> {
        self.delete(&format!("/users/{}", user_id)).await
    }
}
