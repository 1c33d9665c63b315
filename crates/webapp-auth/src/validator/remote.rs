//! Token validation over HTTP against a remote introspection endpoint.
//!
//! The token is sent as the `token` form field of a `POST` to the configured
//! endpoint, authenticated with HTTP Basic using the admin credentials. The
//! endpoint answers with a [`TokenIntrospection`] JSON body.
//!
//! # Connection pool
//!
//! One `reqwest::Client` is shared by all requests. Concurrency is bounded by
//! two semaphores sized from `MaxTotalConnections` and
//! `MaxConnectionsPerHost`; reqwest's idle pool is capped at the per-host
//! limit as well.
//!
//! # Security
//!
//! - The admin password is held as `SecretString` and never logged
//! - Bearer tokens are never logged
//! - HTTP timeouts prevent hanging connections

use super::{
    precheck, OAuthValidationResponse, TokenIntrospection, TokenValidator, ValidationError,
    ValidatorKind,
};
use crate::config::{
    ConfigError, ValidatorConfig, ValidatorProperties, PROP_MAX_CONNECTIONS_PER_HOST,
    PROP_MAX_TOTAL_CONNECTIONS,
};
use crate::secret::{ExposeSecret, SecretString};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, instrument, trace, warn};

/// Default cap on concurrent connections across all hosts.
pub const DEFAULT_MAX_TOTAL_CONNECTIONS: usize = 100;

/// Default cap on concurrent connections to the endpoint host.
pub const DEFAULT_MAX_CONNECTIONS_PER_HOST: usize = 100;

/// Default HTTP request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout for the HTTP client.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Parsed connection pool limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    pub max_total_connections: usize,
    pub max_connections_per_host: usize,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_total_connections: DEFAULT_MAX_TOTAL_CONNECTIONS,
            max_connections_per_host: DEFAULT_MAX_CONNECTIONS_PER_HOST,
        }
    }
}

impl PoolLimits {
    /// Parse pool limits from the raw validator properties.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPoolSetting` if a configured value is not a
    /// positive integer.
    pub fn from_properties(properties: &ValidatorProperties) -> Result<Self, ConfigError> {
        Ok(Self {
            max_total_connections: parse_limit(
                properties.max_total_connections.as_deref(),
                PROP_MAX_TOTAL_CONNECTIONS,
                DEFAULT_MAX_TOTAL_CONNECTIONS,
            )?,
            max_connections_per_host: parse_limit(
                properties.max_connections_per_host.as_deref(),
                PROP_MAX_CONNECTIONS_PER_HOST,
                DEFAULT_MAX_CONNECTIONS_PER_HOST,
            )?,
        })
    }
}

fn parse_limit(raw: Option<&str>, name: &str, default: usize) -> Result<usize, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    let value: usize = raw.trim().parse().map_err(|e| {
        ConfigError::InvalidPoolSetting(format!(
            "{name} must be a valid positive integer, got '{raw}': {e}"
        ))
    })?;

    if value == 0 {
        return Err(ConfigError::InvalidPoolSetting(format!("{name} must be greater than 0")));
    }

    if value > Semaphore::MAX_PERMITS {
        return Err(ConfigError::InvalidPoolSetting(format!(
            "{name} must not exceed {}, got {value}",
            Semaphore::MAX_PERMITS
        )));
    }

    Ok(value)
}

/// Validator calling a remote token introspection endpoint.
pub struct RemoteTokenValidator {
    http_client: Client,
    endpoint_url: String,
    admin_username: String,
    admin_password: SecretString,
    limits: PoolLimits,
    total_permits: Semaphore,
    host_permits: Semaphore,
}

impl std::fmt::Debug for RemoteTokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteTokenValidator")
            .field("endpoint_url", &self.endpoint_url)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"[REDACTED]")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl RemoteTokenValidator {
    /// Create a remote validator from configuration with the default timeout.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidPoolSetting` if pool properties are malformed
    /// - `ConfigError::HttpClient` if the HTTP client cannot be built
    pub fn new(config: &ValidatorConfig) -> Result<Self, ConfigError> {
        Self::with_timeout(config, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a remote validator with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Same as [`RemoteTokenValidator::new`].
    pub fn with_timeout(config: &ValidatorConfig, timeout: Duration) -> Result<Self, ConfigError> {
        let limits = PoolLimits::from_properties(&config.properties)?;

        let http_client = Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .pool_max_idle_per_host(limits.max_connections_per_host)
            .build()
            .map_err(|e| {
                error!(
                    target: "webapp_auth.validator.remote",
                    error = %e,
                    "Failed to build HTTP client"
                );
                ConfigError::HttpClient(e.to_string())
            })?;

        Ok(Self {
            http_client,
            endpoint_url: config.endpoint_url.clone(),
            admin_username: config.admin_username.clone(),
            admin_password: config.admin_password.clone(),
            limits,
            total_permits: Semaphore::new(limits.max_total_connections),
            host_permits: Semaphore::new(limits.max_connections_per_host),
        })
    }

    /// Connection pool limits in effect.
    #[must_use]
    pub fn limits(&self) -> PoolLimits {
        self.limits
    }

    #[instrument(skip_all, fields(endpoint = %self.endpoint_url))]
    async fn introspect(&self, token: &str) -> Result<TokenIntrospection, ValidationError> {
        let _total = self
            .total_permits
            .acquire()
            .await
            .map_err(|_| ValidationError::Transport("connection pool closed".to_string()))?;
        let _host = self
            .host_permits
            .acquire()
            .await
            .map_err(|_| ValidationError::Transport("connection pool closed".to_string()))?;

        let response = self
            .http_client
            .post(&self.endpoint_url)
            .basic_auth(
                &self.admin_username,
                Some(self.admin_password.expose_secret()),
            )
            .header("Accept", "application/json")
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| {
                warn!(
                    target: "webapp_auth.validator.remote",
                    endpoint = %self.endpoint_url,
                    error = %e,
                    "Token validation request failed"
                );
                ValidationError::Transport(e.to_string())
            })?;

        let status = response.status();

        if status.is_success() {
            return response.json::<TokenIntrospection>().await.map_err(|e| {
                warn!(
                    target: "webapp_auth.validator.remote",
                    endpoint = %self.endpoint_url,
                    error = %e,
                    "Failed to parse token validation response"
                );
                ValidationError::InvalidResponse(e.to_string())
            });
        }

        let body = response.text().await.unwrap_or_else(|e| {
            trace!(
                target: "webapp_auth.validator.remote",
                error = %e,
                "Failed to read error response body"
            );
            "<failed to read body>".to_string()
        });
        // Body only at trace level; it may echo request details.
        trace!(target: "webapp_auth.validator.remote", body = %body, "Error response body");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            error!(
                target: "webapp_auth.validator.remote",
                endpoint = %self.endpoint_url,
                status = %status,
                admin_username = %self.admin_username,
                "Token validation endpoint rejected the admin credentials"
            );
            return Err(ValidationError::CredentialsRejected(status.to_string()));
        }

        warn!(
            target: "webapp_auth.validator.remote",
            endpoint = %self.endpoint_url,
            status = %status,
            "Unexpected status from token validation endpoint"
        );
        Err(ValidationError::Transport(format!("unexpected status {status}")))
    }
}

#[async_trait::async_trait]
impl TokenValidator for RemoteTokenValidator {
    async fn check(&self, token: &str) -> Result<OAuthValidationResponse, ValidationError> {
        if let Some(rejected) = precheck(token) {
            return Ok(rejected);
        }

        let response = self.introspect(token).await?.into_response()?;
        debug!(
            target: "webapp_auth.validator.remote",
            valid = response.is_valid(),
            "Token checked against remote endpoint"
        );
        Ok(response)
    }

    fn kind(&self) -> ValidatorKind {
        ValidatorKind::Remote
    }
}
