//! Resource adapters.
//!
//! Each adapter exposes plain async functions over typed records: the
//! provider decodes JSON state into a record, calls the adapter, and encodes
//! the result back.

pub mod group;
pub mod user;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ProviderError;
use crate::schema::Schema;
use crate::types::AttributeChange;
use crate::validation::ensure_valid;

/// Validate `state` against `schema`, then decode it into a typed record.
///
/// Enum values outside their allowed set are rejected here, before any
/// request is made.
pub(crate) fn decode_state<T: DeserializeOwned>(
    schema: &Schema,
    state: &Value,
) -> Result<T, ProviderError> {
    ensure_valid(schema, state)?;
    serde_json::from_value(state.clone()).map_err(|e| ProviderError::Validation(e.to_string()))
}

/// Identifier of a managed entity, or an error if the state has none.
pub(crate) fn require_id<'a>(
    id: Option<&'a str>,
    resource_type: &str,
) -> Result<&'a str, ProviderError> {
    id.filter(|id| !id.is_empty()).ok_or_else(|| {
        ProviderError::InvalidRequest(format!("{} state has no id", resource_type))
    })
}

/// Per-attribute changes between two encoded states.
pub(crate) fn diff_attributes(prior: &Value, planned: &Value, names: &[&str]) -> Vec<AttributeChange> {
    names
        .iter()
        .filter_map(|name| {
            AttributeChange::between(
                *name,
                prior.get(*name).unwrap_or(&Value::Null),
                planned.get(*name).unwrap_or(&Value::Null),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_id() {
        assert_eq!(require_id(Some("u-1"), "tableau_user").unwrap(), "u-1");
        assert!(matches!(
            require_id(Some(""), "tableau_user"),
            Err(ProviderError::InvalidRequest(_))
        ));
        assert!(require_id(None, "tableau_user").is_err());
    }

    #[test]
    fn test_diff_attributes() {
        let prior = json!({"name": "a", "email": "a@x", "id": "1"});
        let planned = json!({"name": "a", "email": "b@x", "id": "1", "extra": true});

        let changes = diff_attributes(&prior, &planned, &["name", "email", "missing"]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "email");
    }
}
