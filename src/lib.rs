//! Tableau Provider
//!
//! A declarative infrastructure provider that manages Tableau users and
//! groups through the Tableau REST API.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **Resources**: `tableau_user` and `tableau_group`, each with create,
//!   read, update, delete and import
//! - **Client**: a site-scoped REST client with sign-in/sign-out and typed
//!   errors (a 404 is always [`ProviderError::NotFound`])
//! - **Schema types**: attribute schemas with allowed-value sets, validated
//!   before any request is sent
//! - **ProviderService trait**: the JSON-state lifecycle an orchestrator drives
//! - **Logging**: `tracing` output on stderr, filtered through `RUST_LOG`
//! - **Testing**: [`testing::ProviderTester`] for driving the lifecycle in tests
//!
//! # Quick Start
//!
//! ```ignore
//! use tableau_provider::{ProviderService, TableauProvider};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     tableau_provider::init_logging();
//!
//!     let provider = TableauProvider::new();
//!     provider
//!         .configure(json!({
//!             "server_url": "https://tableau.example.com",
//!             "site": "analytics",
//!             "personal_access_token_name": "ci",
//!             "personal_access_token_secret": "..."
//!         }))
//!         .await?;
//!
//!     let state = provider
//!         .create("tableau_group", json!({"name": "analysts"}))
//!         .await?;
//!     println!("{}", state["id"]);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod provider;
pub mod resources;
pub mod roles;
pub mod schema;
pub mod service;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use client::Client;
pub use config::{ConnectionSettings, Credentials, ProviderConfig, DEFAULT_API_VERSION};
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::TableauProvider;
pub use roles::{AuthSetting, SiteRole};
pub use schema::ProviderSchema;
pub use service::ProviderService;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
