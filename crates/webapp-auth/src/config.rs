//! Token validator configuration.
//!
//! The authenticator framework hands over a flat key-value properties map.
//! [`ValidatorConfig::from_properties`] turns it into an immutable snapshot,
//! expanding `${name}` placeholders in the endpoint URL and rejecting
//! incomplete configurations. The admin password is redacted in Debug output.

use crate::secret::SecretString;
use crate::settings::{expand, SettingsProvider};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::error;

/// Raw authenticator properties as supplied by the framework.
pub type Properties = HashMap<String, String>;

/// Property holding the token validation endpoint URL.
pub const PROP_ENDPOINT_URL: &str = "TokenValidationEndpointUrl";

/// Property holding the admin username for the validation endpoint.
pub const PROP_USERNAME: &str = "Username";

/// Property holding the admin password for the validation endpoint.
pub const PROP_PASSWORD: &str = "Password";

/// Property selecting the remote (`true`) or local validator.
pub const PROP_IS_REMOTE: &str = "IsRemote";

/// Optional cap on connections across all hosts.
pub const PROP_MAX_TOTAL_CONNECTIONS: &str = "MaxTotalConnections";

/// Optional cap on connections to a single host.
pub const PROP_MAX_CONNECTIONS_PER_HOST: &str = "MaxConnectionsPerHost";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required properties needed to initialize the OAuth authenticator are not provided")]
    MissingProperties,

    #[error("OAuth token validation endpoint url is not provided")]
    MissingEndpointUrl,

    #[error("Username to connect to the OAuth token validation endpoint is not provided")]
    MissingUsername,

    #[error("Password to connect to the OAuth token validation endpoint is not provided")]
    MissingPassword,

    #[error("Invalid connection pool configuration: {0}")]
    InvalidPoolSetting(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Connection pool tuning forwarded verbatim to the validator.
///
/// Values are kept as the raw property text; the remote validator parses them
/// and falls back to its built-in defaults when a value is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorProperties {
    /// Raw `MaxTotalConnections` value, if configured.
    pub max_total_connections: Option<String>,

    /// Raw `MaxConnectionsPerHost` value, if configured.
    pub max_connections_per_host: Option<String>,
}

/// Immutable token validator configuration.
#[derive(Clone)]
pub struct ValidatorConfig {
    /// Token validation endpoint URL with placeholders already expanded.
    pub endpoint_url: String,

    /// Admin username used to authenticate to the validation endpoint.
    pub admin_username: String,

    /// Admin password used to authenticate to the validation endpoint.
    pub admin_password: SecretString,

    /// Whether to validate over the network (`true`) or in-process.
    pub is_remote: bool,

    /// Optional connection pool tuning.
    pub properties: ValidatorProperties,
}

impl fmt::Debug for ValidatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"[REDACTED]")
            .field("is_remote", &self.is_remote)
            .field("properties", &self.properties)
            .finish()
    }
}

impl ValidatorConfig {
    /// Build a configuration snapshot from authenticator properties.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingProperties` if `properties` is `None`
    /// - `ConfigError::MissingEndpointUrl` if the endpoint URL is absent or
    ///   empty, before or after placeholder expansion
    /// - `ConfigError::MissingUsername` / `ConfigError::MissingPassword` if the
    ///   admin credentials are absent
    pub fn from_properties(
        properties: Option<&Properties>,
        settings: &dyn SettingsProvider,
    ) -> Result<Self, ConfigError> {
        let properties = properties.ok_or_else(|| {
            error!(target: "webapp_auth.config", "Authenticator properties are not provided");
            ConfigError::MissingProperties
        })?;

        let raw_url = properties
            .get(PROP_ENDPOINT_URL)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingEndpointUrl)?;

        let endpoint_url = expand(raw_url, settings);
        if endpoint_url.is_empty() {
            return Err(ConfigError::MissingEndpointUrl);
        }

        let admin_username = properties
            .get(PROP_USERNAME)
            .cloned()
            .ok_or(ConfigError::MissingUsername)?;

        let admin_password = properties
            .get(PROP_PASSWORD)
            .map(|p| SecretString::from(p.as_str()))
            .ok_or(ConfigError::MissingPassword)?;

        let is_remote = properties
            .get(PROP_IS_REMOTE)
            .is_some_and(|v| parse_bool(v));

        Ok(Self {
            endpoint_url,
            admin_username,
            admin_password,
            is_remote,
            properties: ValidatorProperties {
                max_total_connections: properties.get(PROP_MAX_TOTAL_CONNECTIONS).cloned(),
                max_connections_per_host: properties.get(PROP_MAX_CONNECTIONS_PER_HOST).cloned(),
            },
        })
    }
}

/// `true` iff the text is `"true"` ignoring ASCII case; anything else is `false`.
fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}
