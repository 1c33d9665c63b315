//! Fixed credentials and authenticator properties.

use std::collections::HashMap;
use webapp_auth::config::{
    Properties, PROP_ENDPOINT_URL, PROP_IS_REMOTE, PROP_PASSWORD, PROP_USERNAME,
};

/// Admin username the test introspection server accepts.
pub const TEST_ADMIN_USERNAME: &str = "admin";

/// Admin password the test introspection server accepts.
pub const TEST_ADMIN_PASSWORD: &str = "admin-pass";

/// `Authorization` header for the test admin credentials.
pub const TEST_ADMIN_BASIC_AUTH: &str = "Basic YWRtaW46YWRtaW4tcGFzcw==";

/// Properties selecting the remote validator against `endpoint_url`.
pub fn remote_properties(endpoint_url: &str) -> Properties {
    HashMap::from([
        (PROP_ENDPOINT_URL.to_string(), endpoint_url.to_string()),
        (PROP_USERNAME.to_string(), TEST_ADMIN_USERNAME.to_string()),
        (PROP_PASSWORD.to_string(), TEST_ADMIN_PASSWORD.to_string()),
        (PROP_IS_REMOTE.to_string(), "true".to_string()),
    ])
}

/// Properties selecting the local validator.
pub fn local_properties() -> Properties {
    let mut props = remote_properties("https://localhost:9443/oauth2/introspect");
    props.insert(PROP_IS_REMOTE.to_string(), "false".to_string());
    props
}

/// Settings provider with nothing defined.
pub fn no_settings() -> HashMap<String, String> {
    HashMap::new()
}

/// Settings provider from pairs.
pub fn settings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
