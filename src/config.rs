//! Provider configuration.
//!
//! Every field may be given in the configure payload or through a `TABLEAU_*`
//! environment variable; the payload wins when both are present.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ProviderError;
use crate::schema::{Attribute, Diagnostic, Schema};

/// REST API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "3.19";

/// Raw provider configuration as supplied by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the Tableau server, e.g. `https://tableau.example.com`.
    pub server_url: Option<String>,
    /// REST API version, e.g. `3.19`.
    pub server_version: Option<String>,
    /// Site content URL; empty selects the default site.
    pub site: Option<String>,
    /// Username for password sign-in.
    pub username: Option<String>,
    /// Password for password sign-in.
    pub password: Option<String>,
    /// Personal access token name.
    pub personal_access_token_name: Option<String>,
    /// Personal access token secret.
    pub personal_access_token_secret: Option<String>,
}

/// How the provider authenticates against the server.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A personal access token.
    PersonalAccessToken {
        /// Token name.
        name: String,
        /// Token secret.
        secret: String,
    },
    /// Username and password.
    Password {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
}

// Secrets never reach the logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::PersonalAccessToken { name, .. } => f
                .debug_struct("PersonalAccessToken")
                .field("name", name)
                .finish_non_exhaustive(),
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// Fully resolved settings needed to open a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Server base URL without a trailing slash.
    pub server_url: String,
    /// REST API version.
    pub api_version: String,
    /// Site content URL.
    pub site: String,
    /// Sign-in credentials.
    pub credentials: Credentials,
}

impl ProviderConfig {
    /// Decode the configure payload. `null` is treated as an empty object.
    pub fn from_value(value: Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Fill unset fields from `TABLEAU_*` environment variables.
    pub fn with_env_fallback(self) -> Self {
        self.with_fallback(|key| std::env::var(key).ok())
    }

    /// Fill unset fields from an arbitrary lookup keyed by environment variable name.
    pub fn with_fallback(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fields: [(&mut Option<String>, &str); 7] = [
            (&mut self.server_url, "TABLEAU_SERVER_URL"),
            (&mut self.server_version, "TABLEAU_SERVER_VERSION"),
            (&mut self.site, "TABLEAU_SITE_NAME"),
            (&mut self.username, "TABLEAU_USERNAME"),
            (&mut self.password, "TABLEAU_PASSWORD"),
            (
                &mut self.personal_access_token_name,
                "TABLEAU_PERSONAL_ACCESS_TOKEN_NAME",
            ),
            (
                &mut self.personal_access_token_secret,
                "TABLEAU_PERSONAL_ACCESS_TOKEN_SECRET",
            ),
        ];
        for (field, key) in fields {
            if field.is_none() {
                *field = lookup(key).filter(|v| !v.is_empty());
            }
        }
        self
    }

    /// Check the configuration, returning one diagnostic per problem.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.resolve() {
            Ok(_) => vec![],
            Err(diagnostics) => diagnostics,
        }
    }

    /// Turn the configuration into connection settings.
    pub fn resolve(&self) -> Result<ConnectionSettings, Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();

        let server_url = match non_empty(&self.server_url) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                Some(url.trim_end_matches('/').to_string())
            },
            Some(url) => {
                diagnostics.push(
                    Diagnostic::error("Invalid server_url")
                        .with_detail(format!("\"{}\" must start with http:// or https://", url))
                        .with_attribute("server_url"),
                );
                None
            },
            None => {
                diagnostics.push(
                    Diagnostic::error("Missing required attribute 'server_url'")
                        .with_detail("Set it in the provider block or via TABLEAU_SERVER_URL")
                        .with_attribute("server_url"),
                );
                None
            },
        };

        let token = (
            non_empty(&self.personal_access_token_name),
            non_empty(&self.personal_access_token_secret),
        );
        let password = (non_empty(&self.username), non_empty(&self.password));

        let credentials = match (token, password) {
            ((Some(name), Some(secret)), (None, None)) => Some(Credentials::PersonalAccessToken {
                name: name.to_string(),
                secret: secret.to_string(),
            }),
            ((None, None), (Some(username), Some(password))) => Some(Credentials::Password {
                username: username.to_string(),
                password: password.to_string(),
            }),
            ((None, None), (None, None)) => {
                diagnostics.push(Diagnostic::error("Missing credentials").with_detail(
                    "Provide personal_access_token_name/secret or username/password",
                ));
                None
            },
            ((Some(_), Some(_)), _) | (_, (Some(_), Some(_))) => {
                diagnostics.push(Diagnostic::error("Conflicting credentials").with_detail(
                    "Use either a personal access token or username/password, not both",
                ));
                None
            },
            _ => {
                diagnostics.push(
                    Diagnostic::error("Incomplete credentials")
                        .with_detail("Token name and secret, or username and password, must be set together"),
                );
                None
            },
        };

        match (server_url, credentials) {
            (Some(server_url), Some(credentials)) if diagnostics.is_empty() => {
                Ok(ConnectionSettings {
                    server_url,
                    api_version: non_empty(&self.server_version)
                        .unwrap_or(DEFAULT_API_VERSION)
                        .to_string(),
                    site: self.site.clone().unwrap_or_default(),
                    credentials,
                })
            },
            _ => Err(diagnostics),
        }
    }

    /// Schema of the provider configuration block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "server_url",
                Attribute::optional_string().with_description("Tableau server URL"),
            )
            .with_attribute(
                "server_version",
                Attribute::optional_string().with_description("REST API version"),
            )
            .with_attribute(
                "site",
                Attribute::optional_string().with_description("Site content URL"),
            )
            .with_attribute("username", Attribute::optional_string())
            .with_attribute("password", Attribute::optional_string().sensitive())
            .with_attribute("personal_access_token_name", Attribute::optional_string())
            .with_attribute(
                "personal_access_token_secret",
                Attribute::optional_string().sensitive(),
            )
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn token_config() -> ProviderConfig {
        ProviderConfig::from_value(json!({
            "server_url": "https://tableau.example.com/",
            "site": "analytics",
            "personal_access_token_name": "ci",
            "personal_access_token_secret": "s3cret"
        }))
        .unwrap()
    }

    #[test]
    fn test_resolve_token_config() {
        let settings = token_config().resolve().unwrap();
        assert_eq!(settings.server_url, "https://tableau.example.com");
        assert_eq!(settings.api_version, DEFAULT_API_VERSION);
        assert_eq!(settings.site, "analytics");
        assert!(matches!(
            settings.credentials,
            Credentials::PersonalAccessToken { ref name, .. } if name == "ci"
        ));
    }

    #[test]
    fn test_null_payload_is_empty() {
        assert_eq!(
            ProviderConfig::from_value(Value::Null).unwrap(),
            ProviderConfig::default()
        );
    }

    #[test]
    fn test_env_fallback_fills_only_missing_fields() {
        let env: HashMap<&str, &str> = [
            ("TABLEAU_SERVER_URL", "https://ignored.example.com"),
            ("TABLEAU_SERVER_VERSION", "3.4"),
        ]
        .into_iter()
        .collect();

        let config = token_config().with_fallback(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(
            config.server_url.as_deref(),
            Some("https://tableau.example.com/")
        );
        assert_eq!(config.server_version.as_deref(), Some("3.4"));
    }

    #[test]
    fn test_missing_everything() {
        let diagnostics = ProviderConfig::default().diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics[0].summary.contains("server_url"));
        assert_eq!(diagnostics[1].summary, "Missing credentials");
    }

    #[test]
    fn test_conflicting_and_incomplete_credentials() {
        let mut config = token_config();
        config.username = Some("admin".into());
        config.password = Some("pw".into());
        assert_eq!(config.diagnostics()[0].summary, "Conflicting credentials");

        let mut config = token_config();
        config.personal_access_token_secret = None;
        assert_eq!(config.diagnostics()[0].summary, "Incomplete credentials");
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        let mut config = token_config();
        config.server_url = Some("tableau.example.com".into());
        let diagnostics = config.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("server_url"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let settings = token_config().resolve().unwrap();
        let printed = format!("{:?}", settings);
        assert!(printed.contains("ci"));
        assert!(!printed.contains("s3cret"));
    }
}
