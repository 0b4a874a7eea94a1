//! Schema types for describing provider and resource structure.
//!
//! Every attribute this provider exposes is a string, optionally restricted
//! to a closed set of values. Schemas drive validation before any request
//! reaches Tableau.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The value type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// Any string.
    String,
    /// One of a closed, case-sensitive set of strings.
    Enum(Vec<String>),
}

impl AttributeType {
    /// Accepted values, if the type is closed.
    pub fn allowed_values(&self) -> Option<&[String]> {
        match self {
            AttributeType::String => None,
            AttributeType::Enum(values) => Some(values),
        }
    }
}

/// Who supplies an attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// Must be set in configuration.
    Required,
    /// May be set in configuration.
    Optional,
    /// Set by the provider from the server's answer; never configured.
    Computed,
}

/// Describes a single attribute in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Value type.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Who supplies the value.
    pub presence: Presence,
    /// Hidden from logs and plan output.
    #[serde(default)]
    pub sensitive: bool,
    /// Human-readable description of the attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Changing this attribute forces resource replacement.
    #[serde(default)]
    pub force_new: bool,
}

impl Attribute {
    /// Create a new attribute.
    pub fn new(attr_type: AttributeType, presence: Presence) -> Self {
        Self {
            attr_type,
            presence,
            sensitive: false,
            description: None,
            force_new: false,
        }
    }

    /// A required string.
    pub fn required_string() -> Self {
        Self::new(AttributeType::String, Presence::Required)
    }

    /// An optional string.
    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, Presence::Optional)
    }

    /// A string reported by the server.
    pub fn computed_string() -> Self {
        Self::new(AttributeType::String, Presence::Computed)
    }

    /// Set the description for this attribute.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark this attribute as forcing resource replacement when changed.
    pub fn with_force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Restrict the attribute to a closed set of values.
    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attr_type = AttributeType::Enum(values.into_iter().map(Into::into).collect());
        self
    }

    /// Mark this attribute as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Whether configuration may carry a value for this attribute.
    pub fn is_configurable(&self) -> bool {
        self.presence != Presence::Computed
    }
}

/// Attributes and nested blocks at one level of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Block {
    /// Attributes by name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, Attribute>,
    /// Nested blocks by name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub blocks: HashMap<String, NestedBlock>,
    /// Human-readable description of the block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Block {
    /// Create a new empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute to this block.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Set the description for this block.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A single nested block (at most one instance), e.g. a group's `import` settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedBlock {
    /// The block definition.
    #[serde(flatten)]
    pub block: Block,
    /// Whether the block must be present.
    #[serde(default)]
    pub required: bool,
}

impl NestedBlock {
    /// A block that may be omitted.
    pub fn optional(block: Block) -> Self {
        Self {
            block,
            required: false,
        }
    }

    /// A block that must be present.
    pub fn required(block: Block) -> Self {
        Self {
            block,
            required: true,
        }
    }
}

/// Schema for a resource or the provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema version, bumped when the state layout changes.
    #[serde(default)]
    pub version: u64,
    /// Root block.
    #[serde(flatten)]
    pub block: Block,
}

impl Schema {
    /// Create a new schema with the given version.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            block: Block::new(),
        }
    }

    /// Create a schema at version 0.
    pub fn v0() -> Self {
        Self::new(0)
    }

    /// Add a top-level attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.block.attributes.insert(name.into(), attr);
        self
    }

    /// Add a top-level nested block.
    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.block.blocks.insert(name.into(), block);
        self
    }

    /// Names of top-level attributes flagged `force_new`.
    pub fn force_new_attributes(&self) -> Vec<&str> {
        self.block
            .attributes
            .iter()
            .filter(|(_, attr)| attr.force_new)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::v0()
    }
}

/// Provider configuration schema plus one schema per resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderSchema {
    /// Provider configuration.
    #[serde(default)]
    pub provider: Schema,
    /// Resource schemas keyed by type name (`tableau_user`, ...).
    #[serde(default)]
    pub resources: HashMap<String, Schema>,
}

impl ProviderSchema {
    /// Create a new empty provider schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider configuration schema.
    pub fn with_provider_config(mut self, schema: Schema) -> Self {
        self.provider = schema;
        self
    }

    /// Add a resource schema.
    pub fn with_resource(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Blocks the operation.
    Error,
    /// Reported, but the operation proceeds.
    Warning,
}

/// A problem found in configuration or state, optionally tied to an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity.
    pub severity: DiagnosticSeverity,
    /// One-line summary.
    pub summary: String,
    /// Longer explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Dotted attribute path, e.g. `import.minimum_site_role`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    fn with_severity(severity: DiagnosticSeverity, summary: impl Into<String>) -> Self {
        Self {
            severity,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Error, summary)
    }

    /// Create a warning diagnostic.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Warning, summary)
    }

    /// Add detail to this diagnostic.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the attribute path for this diagnostic.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Whether this diagnostic blocks the operation.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_builders() {
        let attr = Attribute::required_string()
            .with_description("Site role for the user")
            .with_allowed_values(["Creator", "Viewer"]);

        assert_eq!(attr.presence, Presence::Required);
        assert_eq!(attr.description.as_deref(), Some("Site role for the user"));
        assert_eq!(
            attr.attr_type.allowed_values(),
            Some(&["Creator".to_string(), "Viewer".to_string()][..])
        );
        assert!(!attr.force_new);
        assert!(attr.is_configurable());
        assert!(!Attribute::computed_string().is_configurable());
    }

    #[test]
    fn test_schema_builder() {
        let schema = Schema::v0()
            .with_attribute("name", Attribute::required_string().with_force_new())
            .with_attribute("id", Attribute::computed_string())
            .with_block(
                "import",
                NestedBlock::optional(
                    Block::new().with_attribute("minimum_site_role", Attribute::optional_string()),
                ),
            );

        assert_eq!(schema.version, 0);
        assert!(schema.block.attributes.contains_key("id"));
        assert!(schema.block.blocks.contains_key("import"));
        assert_eq!(schema.force_new_attributes(), vec!["name"]);
    }

    #[test]
    fn test_schema_serialization() {
        let schema = Schema::v0()
            .with_attribute(
                "auth_setting",
                Attribute::required_string().with_allowed_values(["SAML"]),
            )
            .with_attribute("password", Attribute::optional_string().sensitive());
        let json = serde_json::to_value(&schema).unwrap();

        assert_eq!(
            json["attributes"]["auth_setting"]["type"],
            serde_json::json!({"enum": ["SAML"]})
        );
        assert_eq!(json["attributes"]["auth_setting"]["presence"], "required");
        assert_eq!(json["attributes"]["password"]["type"], "string");
        assert_eq!(json["attributes"]["password"]["sensitive"], true);
    }

    #[test]
    fn test_diagnostic() {
        let err = Diagnostic::error("Invalid configuration")
            .with_detail("server_url is required")
            .with_attribute("server_url");

        assert!(err.is_error());
        assert_eq!(err.detail.as_deref(), Some("server_url is required"));
        assert_eq!(err.attribute.as_deref(), Some("server_url"));
        assert!(!Diagnostic::warning("heads up").is_error());
    }
}
