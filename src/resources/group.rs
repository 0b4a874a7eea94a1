//! `tableau_group` resource.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::{decode_state, diff_attributes, require_id};
use crate::client::{Client, Group};
use crate::error::ProviderError;
use crate::roles::SiteRole;
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::types::AttributeChange;

/// Resource type name.
pub const RESOURCE_TYPE: &str = "tableau_group";

const ALL_ATTRIBUTES: [&str; 2] = ["name", "import"];

/// Import settings block of a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupImportModel {
    /// Site role granted to members added through directory import.
    #[serde(default)]
    pub minimum_site_role: Option<SiteRole>,
    /// License grant mode reported by the server.
    #[serde(default)]
    pub grant_license_mode: Option<String>,
}

impl GroupImportModel {
    /// Whether neither setting is present.
    pub fn is_empty(&self) -> bool {
        self.minimum_site_role.is_none() && self.grant_license_mode.is_none()
    }
}

/// State of a managed group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupModel {
    /// Remote identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Group name.
    pub name: String,
    /// Import settings, absent for plain local groups.
    #[serde(default)]
    pub import: Option<GroupImportModel>,
}

impl GroupModel {
    /// Schema of the resource.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "id",
                Attribute::computed_string().with_description("Group identifier"),
            )
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Group name"),
            )
            .with_block(
                "import",
                NestedBlock::optional(
                    Block::new()
                        .with_description("Directory import settings")
                        .with_attribute(
                            "minimum_site_role",
                            Attribute::optional_string()
                                .with_description("Site role granted on import")
                                .with_allowed_values(SiteRole::names()),
                        )
                        .with_attribute(
                            "grant_license_mode",
                            Attribute::computed_string()
                                .with_description("When licenses are granted"),
                        ),
                ),
            )
    }

    /// Validate and decode JSON state. An empty `import` block decodes as absent.
    pub fn from_state(state: &Value) -> Result<Self, ProviderError> {
        let model: Self = decode_state(&Self::schema(), state)?;
        Ok(model.normalized())
    }

    fn normalized(mut self) -> Self {
        self.import = self.import.filter(|i| !i.is_empty());
        self
    }

    /// Encode as JSON state.
    pub fn to_state(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "import": self.import,
        })
    }

    /// Minimum site role, if any.
    pub fn minimum_site_role(&self) -> Option<SiteRole> {
        self.import.as_ref().and_then(|i| i.minimum_site_role)
    }

    /// Whether moving from `self` to `planned` needs an update call.
    ///
    /// The license grant mode is server-computed and never sent.
    pub fn needs_remote_update(&self, planned: &GroupModel) -> bool {
        self.name != planned.name || self.minimum_site_role() != planned.minimum_site_role()
    }

    /// Carry server-computed values (id, license grant mode) over from `prior`.
    pub fn with_computed_from(mut self, prior: &GroupModel) -> Self {
        self.id = prior.id.clone();
        let prior_mode = prior
            .import
            .as_ref()
            .and_then(|i| i.grant_license_mode.clone());
        if let Some(import) = self.import.as_mut() {
            import.grant_license_mode = prior_mode;
        } else if prior_mode.is_some() {
            self.import = Some(GroupImportModel {
                minimum_site_role: None,
                grant_license_mode: prior_mode,
            });
        }
        self.normalized()
    }

    /// Attribute-level changes from `prior` (None on create) to `self`.
    pub fn changes_from(&self, prior: Option<&GroupModel>) -> Vec<AttributeChange> {
        let prior = prior.map(GroupModel::to_state).unwrap_or(Value::Null);
        diff_attributes(&prior, &self.to_state(), &ALL_ATTRIBUTES)
    }
}

impl From<Group> for GroupModel {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            name: group.name,
            import: Some(GroupImportModel {
                minimum_site_role: group.import.minimum_site_role,
                grant_license_mode: group.import.grant_license_mode,
            }),
        }
        .normalized()
    }
}

/// Create the group; state comes from the create response.
#[instrument(skip(client, planned), fields(name = %planned.name))]
pub async fn create(client: &Client, planned: &GroupModel) -> Result<GroupModel, ProviderError> {
    let created = client
        .create_group(&planned.name, planned.minimum_site_role())
        .await?;
    if created.id.is_none() {
        return Err(ProviderError::InvalidRequest(
            "create group response carried no id".to_string(),
        ));
    }
    info!(group_id = ?created.id, "Group created");
    Ok(created.into())
}

/// Fetch the group. A missing group is an error.
#[instrument(skip(client))]
pub async fn read(client: &Client, group_id: &str) -> Result<GroupModel, ProviderError> {
    let mut model = GroupModel::from(client.get_group(group_id).await?);
    model.id.get_or_insert_with(|| group_id.to_string());
    Ok(model)
}

/// Push a changed name or minimum site role, then refresh from the server.
#[instrument(skip(client, prior, planned))]
pub async fn update(
    client: &Client,
    prior: &GroupModel,
    planned: &GroupModel,
) -> Result<GroupModel, ProviderError> {
    let id = require_id(prior.id.as_deref(), RESOURCE_TYPE)?;

    if prior.needs_remote_update(planned) {
        client
            .update_group(id, &planned.name, planned.minimum_site_role())
            .await?;
        info!(group_id = %id, "Group updated");
    } else {
        debug!(group_id = %id, "Nothing to send, refreshing only");
    }

    read(client, id).await
}

/// Delete the group.
#[instrument(skip(client))]
pub async fn delete(client: &Client, group_id: &str) -> Result<(), ProviderError> {
    client.delete_group(group_id).await?;
    info!(group_id, "Group deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GroupImport;
    use serde_json::json;

    #[test]
    fn test_state_round_trip() {
        let state = json!({
            "id": "g-1",
            "name": "analysts",
            "import": {"minimum_site_role": "Explorer", "grant_license_mode": "onSync"}
        });
        let model = GroupModel::from_state(&state).unwrap();
        assert_eq!(model.minimum_site_role(), Some(SiteRole::Explorer));
        assert_eq!(model.to_state(), state);
    }

    #[test]
    fn test_rejects_unknown_minimum_site_role() {
        let state = json!({"name": "analysts", "import": {"minimum_site_role": "Boss"}});
        assert!(matches!(
            GroupModel::from_state(&state),
            Err(ProviderError::Validation(_))
        ));
    }

    #[test]
    fn test_from_group_without_import() {
        let model = GroupModel::from(Group {
            id: Some("g-1".into()),
            name: "local".into(),
            import: GroupImport::default(),
        });
        assert!(model.import.is_none());
        assert_eq!(model.to_state()["import"], Value::Null);
    }

    #[test]
    fn test_needs_remote_update_ignores_grant_license_mode() {
        let prior = GroupModel {
            id: Some("g-1".into()),
            name: "analysts".into(),
            import: Some(GroupImportModel {
                minimum_site_role: Some(SiteRole::Viewer),
                grant_license_mode: Some("onLogin".into()),
            }),
        };

        let mut planned = prior.clone();
        planned.import = Some(GroupImportModel {
            minimum_site_role: Some(SiteRole::Viewer),
            grant_license_mode: None,
        });
        assert!(!prior.needs_remote_update(&planned));

        planned.name = "data analysts".into();
        assert!(prior.needs_remote_update(&planned));

        let mut planned = prior.clone();
        planned.import = None;
        assert!(prior.needs_remote_update(&planned));
    }

    #[test]
    fn test_with_computed_from_suppresses_spurious_diff() {
        let prior = GroupModel {
            id: Some("g-1".into()),
            name: "analysts".into(),
            import: Some(GroupImportModel {
                minimum_site_role: None,
                grant_license_mode: Some("onLogin".into()),
            }),
        };
        let proposed = GroupModel {
            id: None,
            name: "analysts".into(),
            import: None,
        };

        let planned = proposed.with_computed_from(&prior);
        assert_eq!(planned.id.as_deref(), Some("g-1"));
        assert!(planned.changes_from(Some(&prior)).is_empty());
    }

    #[test]
    fn test_empty_import_block_is_absent() {
        let read_back = GroupModel::from(Group {
            id: Some("g-1".into()),
            name: "analysts".into(),
            import: GroupImport::default(),
        });

        for proposed in [
            json!({"name": "analysts", "import": {}}),
            json!({"name": "analysts", "import": {"minimum_site_role": null}}),
        ] {
            let planned = GroupModel::from_state(&proposed)
                .unwrap()
                .with_computed_from(&read_back);
            assert!(planned.import.is_none());
            assert!(planned.changes_from(Some(&read_back)).is_empty());
        }
    }

    #[test]
    fn test_changes_from() {
        let model = GroupModel {
            id: None,
            name: "analysts".into(),
            import: None,
        };
        let changes = model.changes_from(None);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "name");
    }
}
