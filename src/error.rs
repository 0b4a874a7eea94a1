//! Error types for the Tableau provider.

use thiserror::Error;

use crate::schema::Diagnostic;

/// Errors that can occur while talking to Tableau or handling resource state.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested entity does not exist on the server.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code returned by the server.
        status: u16,
        /// Raw response body, usually a Tableau error document.
        body: String,
    },

    /// The request never completed (connection, TLS, timeout...).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A request or response body could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The pagination block of a listing could not be interpreted.
    #[error("Invalid pagination: {0}")]
    Pagination(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// Invalid request from the orchestrator (e.g. state without an id).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Build an error from a failed HTTP exchange.
    ///
    /// A 404 always maps to [`ProviderError::NotFound`] so that callers can
    /// branch on the variant instead of the message text.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        if status == reqwest::StatusCode::NOT_FOUND {
            Self::NotFound(body)
        } else {
            Self::Http {
                status: status.as_u16(),
                body,
            }
        }
    }

    /// Whether the entity behind the request no longer exists.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        Diagnostic::error(err.to_string())
    }
}
