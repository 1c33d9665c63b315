//! Builds the configured token validator once at startup.

use super::{LocalTokenValidator, RemoteTokenValidator, TokenValidator};
use crate::authority::TokenAuthority;
use crate::config::{ConfigError, Properties, ValidatorConfig};
use crate::settings::SettingsProvider;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Selects and constructs the [`TokenValidator`] variant named by configuration.
///
/// The local variant consults a co-located [`TokenAuthority`] registered with
/// [`ValidatorFactory::with_local_authority`]. Without one the local validator
/// still builds and fails each check with a transport error. The returned
/// `Arc` is meant to be built once and shared for the lifetime of the process.
#[derive(Clone, Default)]
pub struct ValidatorFactory {
    local_authority: Option<Arc<dyn TokenAuthority>>,
}

impl std::fmt::Debug for ValidatorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorFactory")
            .field("has_local_authority", &self.local_authority.is_some())
            .finish()
    }
}

impl ValidatorFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the authority used for local validation.
    #[must_use]
    pub fn with_local_authority(mut self, authority: Arc<dyn TokenAuthority>) -> Self {
        self.local_authority = Some(authority);
        self
    }

    /// Build the validator selected by `config.is_remote`.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidPoolSetting` / `ConfigError::HttpClient` from the
    /// remote validator. Building the local validator never fails.
    pub fn build(&self, config: &ValidatorConfig) -> Result<Arc<dyn TokenValidator>, ConfigError> {
        if config.is_remote {
            let remote = RemoteTokenValidator::new(config)?;
            info!(
                target: "webapp_auth.validator.factory",
                endpoint = %config.endpoint_url,
                max_total_connections = remote.limits().max_total_connections,
                max_connections_per_host = remote.limits().max_connections_per_host,
                "Remote token validator initialized"
            );
            return Ok(Arc::new(remote));
        }

        let local = match &self.local_authority {
            Some(authority) => LocalTokenValidator::new(Arc::clone(authority)),
            None => {
                warn!(
                    target: "webapp_auth.validator.factory",
                    "Local token validator initialized without a token authority"
                );
                LocalTokenValidator::without_authority()
            }
        };
        info!(target: "webapp_auth.validator.factory", "Local token validator initialized");
        Ok(Arc::new(local))
    }

    /// Parse authenticator properties and build the validator in one step.
    ///
    /// # Errors
    ///
    /// Any error from [`ValidatorConfig::from_properties`] or
    /// [`ValidatorFactory::build`].
    pub fn build_from_properties(
        &self,
        properties: Option<&Properties>,
        settings: &dyn SettingsProvider,
    ) -> Result<Arc<dyn TokenValidator>, ConfigError> {
        let config = ValidatorConfig::from_properties(properties, settings).map_err(|e| {
            error!(
                target: "webapp_auth.validator.factory",
                error = %e,
                "Invalid token validator configuration"
            );
            e
        })?;
        self.build(&config)
    }
}
