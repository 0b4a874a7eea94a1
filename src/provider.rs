//! The Tableau provider: configuration, session handling and dispatch of
//! lifecycle operations to the resource adapters.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::client::Client;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::resources::group::{self, GroupModel};
use crate::resources::user::{self, UserModel};
use crate::resources::require_id;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::service::ProviderService;
use crate::types::{AttributeChange, ImportedResource, PlanResult};
use crate::validation::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResourceKind {
    User,
    Group,
}

impl ResourceKind {
    fn parse(resource_type: &str) -> Result<Self, ProviderError> {
        match resource_type {
            user::RESOURCE_TYPE => Ok(Self::User),
            group::RESOURCE_TYPE => Ok(Self::Group),
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }
}

/// Provider managing Tableau users and groups.
///
/// Holds the signed-in client once [`ProviderService::configure`] succeeds;
/// every resource operation before that fails with a configuration error.
#[derive(Debug, Default)]
pub struct TableauProvider {
    client: RwLock<Option<Arc<Client>>>,
}

impl TableauProvider {
    /// Create an unconfigured provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider around an existing session.
    pub fn with_client(client: Client) -> Self {
        Self {
            client: RwLock::new(Some(Arc::new(client))),
        }
    }

    async fn client(&self) -> Result<Arc<Client>, ProviderError> {
        self.client.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration("provider has not been configured".to_string())
        })
    }
}

/// One change per attribute that disappears when the resource is destroyed.
fn removal_changes(prior: &Value) -> Vec<AttributeChange> {
    match prior {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| AttributeChange::removed(k.clone(), v.clone()))
            .collect(),
        _ => vec![],
    }
}

fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics
        .iter()
        .any(|d| d.severity == DiagnosticSeverity::Error)
}

#[async_trait::async_trait]
impl ProviderService for TableauProvider {
    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(ProviderConfig::schema())
            .with_resource(user::RESOURCE_TYPE, UserModel::schema())
            .with_resource(group::RESOURCE_TYPE, GroupModel::schema())
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        debug!("ValidateProviderConfig called");
        let mut diagnostics = validate(&ProviderConfig::schema(), &config);
        if !has_errors(&diagnostics) {
            let config = ProviderConfig::from_value(config)?.with_env_fallback();
            diagnostics.extend(config.diagnostics());
        }
        if has_errors(&diagnostics) {
            warn!(diagnostics = diagnostics.len(), "ValidateProviderConfig completed with errors");
        }
        Ok(diagnostics)
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        debug!("Configure called");
        let config = ProviderConfig::from_value(config)?.with_env_fallback();
        let settings = match config.resolve() {
            Ok(settings) => settings,
            Err(diagnostics) => {
                warn!(diagnostics = diagnostics.len(), "Configure completed with errors");
                return Ok(diagnostics);
            },
        };

        let client = Client::sign_in(&settings).await.map_err(|e| {
            error!(error = %e, "Sign-in failed");
            e
        })?;
        *self.client.write().await = Some(Arc::new(client));
        info!("Configure completed successfully");
        Ok(vec![])
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        info!("Stop called");
        let client = self.client.write().await.take();
        if let Some(client) = client {
            if let Err(e) = client.sign_out().await {
                error!(error = %e, "Stop failed");
                return Err(e);
            }
        }
        info!("Stop completed successfully");
        Ok(())
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        let kind = ResourceKind::parse(resource_type)?;
        debug!(resource_type, is_create = prior_state.is_none(), "Plan called");

        if proposed_state.is_null() {
            let changes = prior_state.as_ref().map(removal_changes).unwrap_or_default();
            return Ok(PlanResult::with_changes(Value::Null, changes, false));
        }

        let (planned_state, changes) = match kind {
            ResourceKind::User => {
                let prior = prior_state.as_ref().map(UserModel::from_state).transpose()?;
                let mut planned = UserModel::from_state(&proposed_state)?;
                planned.id = prior.as_ref().and_then(|p| p.id.clone());
                let changes = planned.changes_from(prior.as_ref());
                (planned.to_state(), changes)
            },
            ResourceKind::Group => {
                let prior = prior_state.as_ref().map(GroupModel::from_state).transpose()?;
                let mut planned = GroupModel::from_state(&proposed_state)?;
                planned = match &prior {
                    Some(prior) => planned.with_computed_from(prior),
                    None => {
                        planned.id = None;
                        planned
                    },
                };
                let changes = planned.changes_from(prior.as_ref());
                (planned.to_state(), changes)
            },
        };

        let requires_replace = prior_state.is_some() && {
            let schema = self.schema();
            let force_new = schema
                .resources
                .get(resource_type)
                .map(|s| s.force_new_attributes())
                .unwrap_or_default();
            changes.iter().any(|c| force_new.contains(&c.path.as_str()))
        };
        let plan = PlanResult::with_changes(planned_state, changes, requires_replace);

        info!(
            resource_type,
            changes = plan.changes.len(),
            "Plan completed"
        );
        Ok(plan)
    }

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        let kind = ResourceKind::parse(resource_type)?;
        info!(resource_type, "Create called");

        let result = match kind {
            ResourceKind::User => {
                let planned = UserModel::from_state(&planned_state)?;
                let client = self.client().await?;
                user::create(&client, &planned).await.map(|m| m.to_state())
            },
            ResourceKind::Group => {
                let planned = GroupModel::from_state(&planned_state)?;
                let client = self.client().await?;
                group::create(&client, &planned).await.map(|m| m.to_state())
            },
        };

        match &result {
            Ok(_) => info!(resource_type, "Create completed successfully"),
            Err(e) => error!(resource_type, error = %e, "Create failed"),
        }
        result
    }

    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        let kind = ResourceKind::parse(resource_type)?;
        debug!(resource_type, "Read called");

        let result = match kind {
            ResourceKind::User => {
                let current = UserModel::from_state(&current_state)?;
                // Already dropped by an earlier refresh.
                let Some(id) = current.id.as_deref() else {
                    return Ok(current_state);
                };
                let client = self.client().await?;
                match user::read(&client, id).await? {
                    Some(model) => Ok(model.to_state()),
                    None => {
                        let mut gone = current.clone();
                        gone.id = None;
                        Ok(gone.to_state())
                    },
                }
            },
            ResourceKind::Group => {
                let current = GroupModel::from_state(&current_state)?;
                let id = require_id(current.id.as_deref(), resource_type)?;
                let client = self.client().await?;
                group::read(&client, id).await.map(|m| m.to_state())
            },
        };

        if let Err(e) = &result {
            error!(resource_type, error = %e, "Read failed");
        }
        result
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let kind = ResourceKind::parse(resource_type)?;
        info!(resource_type, "Update called");

        let result = match kind {
            ResourceKind::User => {
                let prior = UserModel::from_state(&prior_state)?;
                let planned = UserModel::from_state(&planned_state)?;
                let client = self.client().await?;
                match user::update(&client, &prior, &planned).await {
                    Ok(Some(model)) => Ok(model.to_state()),
                    Ok(None) => {
                        warn!(resource_type, "User no longer exists, clearing id");
                        let mut gone = planned.clone();
                        gone.id = None;
                        Ok(gone.to_state())
                    },
                    Err(e) => Err(e),
                }
            },
            ResourceKind::Group => {
                let prior = GroupModel::from_state(&prior_state)?;
                let planned = GroupModel::from_state(&planned_state)?;
                let client = self.client().await?;
                group::update(&client, &prior, &planned)
                    .await
                    .map(|m| m.to_state())
            },
        };

        match &result {
            Ok(_) => info!(resource_type, "Update completed successfully"),
            Err(e) => error!(resource_type, error = %e, "Update failed"),
        }
        result
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let kind = ResourceKind::parse(resource_type)?;
        info!(resource_type, "Delete called");

        let id = current_state
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string);
        let id = require_id(id.as_deref(), resource_type)?;
        let client = self.client().await?;

        let result = match kind {
            ResourceKind::User => user::delete(&client, id).await,
            ResourceKind::Group => group::delete(&client, id).await,
        };

        match &result {
            Ok(()) => info!(resource_type, "Delete completed successfully"),
            Err(e) => error!(resource_type, error = %e, "Delete failed"),
        }
        result
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let kind = ResourceKind::parse(resource_type)?;
        info!(resource_type, id, "ImportResourceState called");
        let client = self.client().await?;

        let state = match kind {
            ResourceKind::User => user::read(&client, id)
                .await?
                .ok_or_else(|| ProviderError::NotFound(format!("user ID {}", id)))?
                .to_state(),
            ResourceKind::Group => group::read(&client, id).await?.to_state(),
        };

        info!(resource_type, id, "ImportResourceState completed");
        Ok(vec![ImportedResource::new(resource_type, state)])
    }
}
