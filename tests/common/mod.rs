//! Common test utilities for tableau-provider integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use tableau_provider::{Client, TableauProvider};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SITE_ID: &str = "site-1";
pub const TOKEN: &str = "test-token";
pub const API_VERSION: &str = "3.19";

/// Path of a site-scoped endpoint as the mock server sees it.
pub fn site_path(suffix: &str) -> String {
    format!("/api/{}/sites/{}{}", API_VERSION, SITE_ID, suffix)
}

/// Test data factory for Tableau users.
pub fn user_json(id: &str, name: &str, site_role: &str) -> Value {
    json!({
        "id": id,
        "email": format!("{}@example.com", name),
        "name": name,
        "fullName": format!("Test User {}", name),
        "siteRole": site_role,
        "authSetting": "ServerDefault"
    })
}

/// Test data factory for Tableau groups.
pub fn group_json(id: &str, name: &str) -> Value {
    json!({"id": id, "name": name})
}

/// Test data factory for imported groups.
pub fn imported_group_json(id: &str, name: &str, site_role: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "import": {"siteRole": site_role, "grantLicenseMode": "onLogin"}
    })
}

/// One page of a group listing.
pub fn group_page(groups: Vec<Value>, page_number: u32, page_size: u32, total: u64) -> Value {
    json!({
        "pagination": {
            "pageNumber": page_number.to_string(),
            "pageSize": page_size.to_string(),
            "totalAvailable": total.to_string()
        },
        "groups": {"group": groups}
    })
}

/// Tableau error document.
pub fn error_json(code: &str, summary: &str) -> Value {
    json!({"error": {"code": code, "summary": summary, "detail": summary}})
}

/// Provider state of a user as produced by [`user_json`].
pub fn user_state(id: &str, name: &str, site_role: &str) -> Value {
    json!({
        "id": id,
        "email": format!("{}@example.com", name),
        "name": name,
        "full_name": format!("Test User {}", name),
        "site_role": site_role,
        "auth_setting": "ServerDefault"
    })
}

/// Mock server wrapper with Tableau setup helpers.
pub struct MockTableauServer {
    pub server: MockServer,
}

impl MockTableauServer {
    pub async fn new() -> Self {
        tableau_provider::try_init_logging();
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// A client already signed in to [`SITE_ID`].
    pub fn client(&self) -> Client {
        Client::new(
            format!("{}/api/{}/sites/{}", self.url(), API_VERSION, SITE_ID),
            TOKEN,
        )
        .expect("client")
    }

    pub fn provider(&self) -> TableauProvider {
        TableauProvider::with_client(self.client())
    }

    pub async fn mock_sign_in(&self) {
        Mock::given(method("POST"))
            .and(path(format!("/api/{}/auth/signin", API_VERSION)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "credentials": {
                    "token": TOKEN,
                    "site": {"id": SITE_ID, "contentUrl": "analytics"},
                    "user": {"id": "admin-id"}
                }
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_sign_out(&self) {
        Mock::given(method("POST"))
            .and(path(format!("/api/{}/auth/signout", API_VERSION)))
            .and(header("X-Tableau-Auth", TOKEN))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_get_user(&self, id: &str, user: Value) {
        Mock::given(method("GET"))
            .and(path(site_path(&format!("/users/{}", id))))
            .and(header("X-Tableau-Auth", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user})))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_user_not_found(&self, id: &str) {
        Mock::given(method("GET"))
            .and(path(site_path(&format!("/users/{}", id))))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(error_json("404002", "User not found")),
            )
            .mount(&self.server)
            .await;
    }

    /// First page of the group listing, requested without `pageNumber`.
    pub async fn mock_first_group_page(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path(site_path("/groups")))
            .and(query_param_is_missing("pageNumber"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_group_page(&self, page: u32, body: Value) {
        Mock::given(method("GET"))
            .and(path(site_path("/groups")))
            .and(query_param("pageNumber", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}
