//! Closed enumerations for user access levels and authentication mechanisms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Access level of a user on a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteRole {
    /// Full authoring and publishing.
    Creator,
    /// Web editing of existing content.
    Explorer,
    /// Explorer who may also publish.
    ExplorerCanPublish,
    /// Site administrator with an Explorer license.
    SiteAdministratorExplorer,
    /// Site administrator with a Creator license.
    SiteAdministratorCreator,
    /// No license; cannot sign in.
    Unlicensed,
    /// View and interact only.
    Viewer,
}

impl SiteRole {
    /// Every accepted site role, in declaration order.
    pub const ALL: [SiteRole; 7] = [
        SiteRole::Creator,
        SiteRole::Explorer,
        SiteRole::ExplorerCanPublish,
        SiteRole::SiteAdministratorExplorer,
        SiteRole::SiteAdministratorCreator,
        SiteRole::Unlicensed,
        SiteRole::Viewer,
    ];

    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteRole::Creator => "Creator",
            SiteRole::Explorer => "Explorer",
            SiteRole::ExplorerCanPublish => "ExplorerCanPublish",
            SiteRole::SiteAdministratorExplorer => "SiteAdministratorExplorer",
            SiteRole::SiteAdministratorCreator => "SiteAdministratorCreator",
            SiteRole::Unlicensed => "Unlicensed",
            SiteRole::Viewer => "Viewer",
        }
    }

    /// Wire names of every role, for schema declarations.
    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::ALL.iter().map(SiteRole::as_str)
    }
}

impl fmt::Display for SiteRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteRole {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ProviderError::Validation(format!("unknown site role \"{}\"", s)))
    }
}

/// Authentication mechanism of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthSetting {
    /// SAML single sign-on.
    #[serde(rename = "SAML")]
    Saml,
    /// Whatever the server is configured to use.
    #[serde(rename = "ServerDefault")]
    ServerDefault,
    /// OpenID Connect.
    #[serde(rename = "OpenID")]
    OpenId,
    /// Tableau ID with multi-factor authentication.
    #[serde(rename = "TABID_WITH_MFA")]
    TableauIdWithMfa,
}

impl AuthSetting {
    /// Every accepted auth setting, in declaration order.
    pub const ALL: [AuthSetting; 4] = [
        AuthSetting::Saml,
        AuthSetting::ServerDefault,
        AuthSetting::OpenId,
        AuthSetting::TableauIdWithMfa,
    ];

    /// Wire name of the setting.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthSetting::Saml => "SAML",
            AuthSetting::ServerDefault => "ServerDefault",
            AuthSetting::OpenId => "OpenID",
            AuthSetting::TableauIdWithMfa => "TABID_WITH_MFA",
        }
    }

    /// Wire names of every setting, for schema declarations.
    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::ALL.iter().map(AuthSetting::as_str)
    }
}

impl fmt::Display for AuthSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthSetting {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|setting| setting.as_str() == s)
            .ok_or_else(|| ProviderError::Validation(format!("unknown auth setting \"{}\"", s)))
    }
}
