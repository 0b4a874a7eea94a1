//! HTTP client for the Tableau REST API.
//!
//! [`Client`] holds the site-scoped base URL and the session token and turns
//! every exchange into raw bytes or a typed [`ProviderError`].

mod groups;
mod pagination;
mod users;

pub use groups::{Group, GroupImport};
pub use pagination::{PageNumbers, PaginationDetails};
pub use users::User;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::{ConnectionSettings, Credentials};
use crate::error::ProviderError;

/// Header carrying the session token.
pub const AUTH_HEADER: &str = "X-Tableau-Auth";

/// A signed-in, site-scoped Tableau REST client.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl Client {
    /// Create a client for an already-known site URL and session token.
    ///
    /// `api_url` is `{server}/api/{version}/sites/{site_id}`.
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            http: build_http_client()?,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Sign in and return a client scoped to the signed-in site.
    #[instrument(skip(settings), fields(server = %settings.server_url, site = %settings.site))]
    pub async fn sign_in(settings: &ConnectionSettings) -> Result<Self, ProviderError> {
        let http = build_http_client()?;
        let url = format!(
            "{}/api/{}/auth/signin",
            settings.server_url, settings.api_version
        );

        let request = SignInRequest {
            credentials: SignInCredentials::new(&settings.credentials, &settings.site),
        };
        let response = http.post(&url).json(&request).send().await?;
        let body = read_body(response).await?;
        let signed_in: SignInResponse = serde_json::from_slice(&body)?;

        let api_url = format!(
            "{}/api/{}/sites/{}",
            settings.server_url, settings.api_version, signed_in.credentials.site.id
        );
        info!(site_id = %signed_in.credentials.site.id, "Signed in to Tableau");

        Ok(Self {
            http,
            api_url,
            token: signed_in.credentials.token,
        })
    }

    /// End the session. The token is unusable afterwards.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), ProviderError> {
        let url = match self.api_url.find("/sites/") {
            Some(idx) => format!("{}/auth/signout", &self.api_url[..idx]),
            None => {
                return Err(ProviderError::Configuration(format!(
                    "cannot derive sign-out URL from {}",
                    self.api_url
                )))
            },
        };
        let response = self
            .http
            .post(&url)
            .header(AUTH_HEADER, &self.token)
            .send()
            .await?;
        read_body(response).await?;
        debug!("Signed out of Tableau");
        Ok(())
    }

    /// Site-scoped base URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Issue a request against `{api_url}{path}` and return the raw body.
    ///
    /// Non-success statuses become errors; a 404 becomes
    /// [`ProviderError::NotFound`].
    #[instrument(skip(self, method, body), fields(method = %method))]
    pub async fn do_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>, ProviderError> {
        let url = format!("{}{}", self.api_url, path);
        let mut request = self
            .http
            .request(method, &url)
            .header(AUTH_HEADER, &self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        read_body(response).await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let body = self.do_request::<()>(Method::GET, path, None).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub(crate) async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        let body = self.do_request(method, path, Some(body)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ProviderError> {
        self.do_request::<()>(Method::DELETE, path, None).await?;
        Ok(())
    }
}

fn build_http_client() -> Result<reqwest::Client, ProviderError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(60))
        .build()
        .map_err(|e| ProviderError::Configuration(format!("Failed to create HTTP client: {e}")))
}

async fn read_body(response: reqwest::Response) -> Result<Vec<u8>, ProviderError> {
    let status = response.status();
    let body = response.bytes().await?;
    debug!(status = status.as_u16(), bytes = body.len(), "Response received");

    if status.is_success() {
        Ok(body.to_vec())
    } else {
        Err(ProviderError::from_status(
            status,
            String::from_utf8_lossy(&body).into_owned(),
        ))
    }
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    credentials: SignInCredentials<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInCredentials<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    personal_access_token_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    personal_access_token_secret: Option<&'a str>,
    site: SiteRef<'a>,
}

impl<'a> SignInCredentials<'a> {
    fn new(credentials: &'a Credentials, site: &'a str) -> Self {
        let site = SiteRef { content_url: site };
        match credentials {
            Credentials::PersonalAccessToken { name, secret } => Self {
                name: None,
                password: None,
                personal_access_token_name: Some(name.as_str()),
                personal_access_token_secret: Some(secret.as_str()),
                site,
            },
            Credentials::Password { username, password } => Self {
                name: Some(username.as_str()),
                password: Some(password.as_str()),
                personal_access_token_name: None,
                personal_access_token_secret: None,
                site,
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SiteRef<'a> {
    content_url: &'a str,
}

#[derive(Deserialize)]
struct SignInResponse {
    credentials: SignedInCredentials,
}

#[derive(Deserialize)]
struct SignedInCredentials {
    token: String,
    site: SignedInSite,
}

#[derive(Deserialize)]
struct SignedInSite {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = Client::new("https://t.example.com/api/3.19/sites/s-1/", "tok").unwrap();
        assert_eq!(client.api_url(), "https://t.example.com/api/3.19/sites/s-1");
    }

    #[test]
    fn test_sign_in_body_for_token() {
        let credentials = Credentials::PersonalAccessToken {
            name: "ci".into(),
            secret: "s3cret".into(),
        };
        let request = SignInRequest {
            credentials: SignInCredentials::new(&credentials, "analytics"),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"credentials": {
                "personalAccessTokenName": "ci",
                "personalAccessTokenSecret": "s3cret",
                "site": {"contentUrl": "analytics"}
            }})
        );
    }

    #[test]
    fn test_sign_in_body_for_password() {
        let credentials = Credentials::Password {
            username: "admin".into(),
            password: "pw".into(),
        };
        let request = SignInRequest {
            credentials: SignInCredentials::new(&credentials, ""),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"credentials": {
                "name": "admin",
                "password": "pw",
                "site": {"contentUrl": ""}
            }})
        );
    }
}
