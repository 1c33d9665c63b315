//! Mock token introspection endpoint.
//!
//! Wraps a wiremock server that answers `POST /oauth2/introspect` the way a
//! remote token authority does. Tokens are matched on the exact `token` form
//! field, so tests should use URL-safe token strings.

use crate::fixtures::TEST_ADMIN_BASIC_AUTH;
use wiremock::matchers::{header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Path the test server serves introspection on.
pub const INTROSPECT_PATH: &str = "/oauth2/introspect";

/// Wiremock priority for catch-all responses (lower value wins).
const LOW_PRIORITY: u8 = 10;

/// Wiremock priority for responses overriding every token.
const HIGH_PRIORITY: u8 = 1;

/// Matches a form body whose `token` field equals the expected value.
struct TokenField(String);

impl Match for TokenField {
    fn matches(&self, request: &Request) -> bool {
        let body = String::from_utf8_lossy(&request.body);
        body.split('&')
            .filter_map(|pair| pair.split_once('='))
            .any(|(key, value)| key == "token" && value == self.0)
    }
}

/// Mock remote token authority.
pub struct TestIntrospectionServer {
    server: MockServer,
}

impl TestIntrospectionServer {
    /// Start a server that knows no tokens yet.
    ///
    /// Unknown tokens presented with the test admin credentials are answered
    /// as inactive.
    pub async fn start() -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(INTROSPECT_PATH))
            .and(header("authorization", TEST_ADMIN_BASIC_AUTH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "active": false,
                "error": "invalid_token",
            })))
            .with_priority(LOW_PRIORITY)
            .mount(&server)
            .await;

        Self { server }
    }

    /// Full introspection endpoint URL.
    pub fn endpoint_url(&self) -> String {
        format!("{}{INTROSPECT_PATH}", self.server.uri())
    }

    /// Base URI (scheme, host and port) of the server.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Answer `token` as active for `username` in `tenant_domain`.
    pub async fn with_active_token(&self, token: &str, username: &str, tenant_domain: &str) {
        self.mount_token(
            token,
            serde_json::json!({
                "active": true,
                "username": username,
                "tenant_domain": tenant_domain,
            }),
        )
        .await;
    }

    /// Answer `token` as inactive with `reason`.
    pub async fn with_inactive_token(&self, token: &str, reason: &str) {
        self.mount_token(
            token,
            serde_json::json!({
                "active": false,
                "error": "invalid_token",
                "error_description": reason,
            }),
        )
        .await;
    }

    /// Answer every request with 401, as an endpoint rejecting the admin
    /// credentials does.
    pub async fn rejecting_credentials(&self) {
        Mock::given(method("POST"))
            .and(path(INTROSPECT_PATH))
            .respond_with(ResponseTemplate::new(401))
            .with_priority(HIGH_PRIORITY)
            .mount(&self.server)
            .await;
    }

    /// Requests received so far.
    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    async fn mount_token(&self, token: &str, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(INTROSPECT_PATH))
            .and(header("authorization", TEST_ADMIN_BASIC_AUTH))
            .and(TokenField(token.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}
