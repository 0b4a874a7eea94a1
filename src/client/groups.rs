//! Group endpoints.
//!
//! Tableau has no "get group by id" endpoint, so [`Client::get_group`] walks
//! the paginated `/groups` listing.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::pagination::PaginationDetails;
use super::Client;
use crate::error::ProviderError;
use crate::roles::SiteRole;

/// Directory import settings of a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupImport {
    /// Site role granted to members added through import.
    #[serde(rename = "siteRole", default)]
    pub minimum_site_role: Option<SiteRole>,
    /// When licenses are granted (`onLogin`, `onSync`).
    #[serde(default)]
    pub grant_license_mode: Option<String>,
}

/// A group as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Server-assigned identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Group name.
    pub name: String,
    /// Import settings.
    #[serde(default)]
    pub import: GroupImport,
}

#[derive(Serialize)]
struct NewGroupRequest<'a> {
    group: NewGroup<'a>,
}

// `minimumSiteRole` is always present on the wire, as null when unset.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewGroup<'a> {
    name: &'a str,
    minimum_site_role: Option<SiteRole>,
}

#[derive(Deserialize)]
struct GroupResponse {
    group: Group,
}

#[derive(Deserialize)]
struct GroupListResponse {
    pagination: PaginationDetails,
    #[serde(default)]
    groups: GroupList,
}

#[derive(Default, Deserialize)]
struct GroupList {
    #[serde(default)]
    group: Vec<Group>,
}

impl GroupListResponse {
    fn take(self, group_id: &str) -> Option<Group> {
        self.groups
            .group
            .into_iter()
            .find(|g| g.id.as_deref() == Some(group_id))
    }
}

impl Client {
    /// Find a group by id, scanning every page of the listing.
    #[instrument(skip(self))]
    pub async fn get_group(&self, group_id: &str) -> Result<Group, ProviderError> {
        let first: GroupListResponse = self.get_json("/groups").await?;
        let numbers = first.pagination.numbers()?;
        if let Some(group) = first.take(group_id) {
            return Ok(group);
        }

        for page in numbers.page_number.saturating_add(1)..=numbers.total_pages {
            debug!(page, total_pages = numbers.total_pages, "Searching next group page");
            let listing: GroupListResponse =
                self.get_json(&format!("/groups?pageNumber={}", page)).await?;
            if let Some(group) = listing.take(group_id) {
                return Ok(group);
            }
        }

        Err(ProviderError::NotFound(format!("group ID {}", group_id)))
    }

    /// Create a group.
    #[instrument(skip(self))]
    pub async fn create_group(
        &self,
        name: &str,
        minimum_site_role: Option<SiteRole>,
    ) -> Result<Group, ProviderError> {
        let request = NewGroupRequest {
            group: NewGroup {
                name,
                minimum_site_role,
            },
        };
        let response: GroupResponse = self.send_json(Method::POST, "/groups", &request).await?;
        Ok(response.group)
    }

    /// Rename a group and set its minimum site role.
    #[instrument(skip(self))]
    pub async fn update_group(
        &self,
        group_id: &str,
        name: &str,
        minimum_site_role: Option<SiteRole>,
    ) -> Result<Group, ProviderError> {
        let request = NewGroupRequest {
            group: NewGroup {
                name,
                minimum_site_role,
            },
        };
        let response: GroupResponse = self
            .send_json(Method::PUT, &format!("/groups/{}", group_id), &request)
            .await?;
        Ok(response.group)
    }

    /// Delete a group.
    #[instrument(skip(self))]
    pub async fn delete_group(&self, group_id: &str) -> Result<(), ProviderError> {
        self.delete(&format!("/groups/{}", group_id)).await
    }
}
