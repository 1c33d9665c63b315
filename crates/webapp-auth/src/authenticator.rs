//! OAuth bearer-token authenticator.
//!
//! Ties the pieces together for one request: pull the bearer token out of an
//! `Authorization` header value, check it with the shared validator, and
//! build the [`AuthenticationInfo`] the request pipeline acts on.

use crate::auth_info::{apply, AuthenticationInfo};
use crate::error::Result;
use crate::tenant::TenantResolver;
use crate::validator::TokenValidator;
use std::sync::Arc;
use tracing::{instrument, warn};

const BEARER_SCHEME: &str = "bearer";

/// Extract the token from a `Bearer` authorization header value.
///
/// The scheme is matched case-insensitively. `None` for other schemes or an
/// empty token.
#[must_use]
pub fn bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Authenticates requests carrying OAuth2 bearer tokens.
#[derive(Clone)]
pub struct OAuthAuthenticator {
    validator: Arc<dyn TokenValidator>,
    resolver: TenantResolver,
}

impl std::fmt::Debug for OAuthAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthAuthenticator")
            .field("validator", &self.validator.kind())
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl OAuthAuthenticator {
    #[must_use]
    pub fn new(validator: Arc<dyn TokenValidator>, resolver: TenantResolver) -> Self {
        Self {
            validator,
            resolver,
        }
    }

    /// Whether this authenticator applies to a request with this header value.
    #[must_use]
    pub fn can_handle(&self, authorization: Option<&str>) -> bool {
        authorization.and_then(bearer_token).is_some()
    }

    /// Authenticate a bearer token.
    ///
    /// # Errors
    ///
    /// - `AuthError::Validation` if the token check could not be completed
    /// - `AuthError::TenantLookup` if the token is valid but its tenant cannot
    ///   be resolved
    #[instrument(skip_all, fields(validator = ?self.validator.kind()))]
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticationInfo> {
        let response = self.validator.check(token).await.map_err(|e| {
            warn!(
                target: "webapp_auth.authenticator",
                error = %e,
                "Token validation could not be completed"
            );
            e
        })?;

        let mut info = AuthenticationInfo::new();
        apply(&response, &mut info, &self.resolver).await?;
        Ok(info)
    }

    /// Authenticate using a raw `Authorization` header value.
    ///
    /// A missing or non-bearer header is treated like an empty token.
    ///
    /// # Errors
    ///
    /// Same as [`OAuthAuthenticator::authenticate`].
    pub async fn authenticate_header(
        &self,
        authorization: Option<&str>,
    ) -> Result<AuthenticationInfo> {
        let token = authorization.and_then(bearer_token).unwrap_or_default();
        self.authenticate(token).await
    }
}
