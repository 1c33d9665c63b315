//! OAuth2 bearer-token validation.
//!
//! A [`TokenValidator`] answers one question per request: is this opaque
//! token valid, and if so, for which user and tenant domain. Two variants
//! exist behind the same trait:
//!
//! - [`RemoteTokenValidator`] calls a token introspection endpoint over HTTP
//! - [`LocalTokenValidator`] asks a co-located [`TokenAuthority`] in-process
//!
//! [`ValidatorFactory`] selects one at startup; callers hold the result as
//! `Arc<dyn TokenValidator>` and never need to know which variant is active.
//!
//! # Error model
//!
//! An invalid, expired or revoked token is NOT an error: `check` returns
//! `Ok` with `is_valid == false` and an error message. `ValidationError` is
//! reserved for failures to complete the check at all.
//!
//! [`TokenAuthority`]: crate::authority::TokenAuthority

pub mod factory;
pub mod local;
pub mod remote;

pub use factory::ValidatorFactory;
pub use local::LocalTokenValidator;
pub use remote::RemoteTokenValidator;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted bearer token size in bytes (8KB).
///
/// Larger tokens are reported invalid without contacting the authority.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// Error message used when the authority gives no reason for rejection.
pub const DEFAULT_INVALID_TOKEN_MESSAGE: &str = "Invalid access token";

/// Errors that prevent a token check from completing.
#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    /// The authority could not be reached or answered with an unexpected status.
    #[error("Token validation transport error: {0}")]
    Transport(String),

    /// The authority rejected the admin credentials (401, 403).
    #[error("Token validation endpoint rejected the admin credentials: {0}")]
    CredentialsRejected(String),

    /// The authority answered with a body that could not be interpreted.
    #[error("Invalid token validation response: {0}")]
    InvalidResponse(String),
}

/// Which validator implementation is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorKind {
    /// Network call to a separate token authority.
    Remote,
    /// In-process call to a co-located token authority.
    Local,
}

/// Outcome of a single token check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthValidationResponse {
    is_valid: bool,
    user_name: Option<String>,
    tenant_domain: Option<String>,
    error_msg: Option<String>,
}

impl OAuthValidationResponse {
    /// A valid token owned by `user_name` in `tenant_domain`.
    #[must_use]
    pub fn valid(user_name: impl Into<String>, tenant_domain: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            user_name: Some(user_name.into()),
            tenant_domain: Some(tenant_domain.into()),
            error_msg: None,
        }
    }

    /// A rejected token. Carries no identity.
    #[must_use]
    pub fn invalid(error_msg: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            user_name: None,
            tenant_domain: None,
            error_msg: Some(error_msg.into()),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    #[must_use]
    pub fn tenant_domain(&self) -> Option<&str> {
        self.tenant_domain.as_deref()
    }

    #[must_use]
    pub fn error_msg(&self) -> Option<&str> {
        self.error_msg.as_deref()
    }
}

/// Introspection result as reported by a token authority.
///
/// This is the JSON body returned by the remote introspection endpoint and
/// the value returned by in-process authorities, so both validator variants
/// share one mapping into [`OAuthValidationResponse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenIntrospection {
    /// Whether the token is currently active.
    pub active: bool,

    /// Username the token was issued to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Tenant domain of the token owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_domain: Option<String>,

    /// Short error code for an inactive token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Human readable reason for an inactive token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl TokenIntrospection {
    /// An active token for `username` in `tenant_domain`.
    #[must_use]
    pub fn active(username: impl Into<String>, tenant_domain: impl Into<String>) -> Self {
        Self {
            active: true,
            username: Some(username.into()),
            tenant_domain: Some(tenant_domain.into()),
            ..Self::default()
        }
    }

    /// An inactive token with a reason.
    #[must_use]
    pub fn inactive(error_description: impl Into<String>) -> Self {
        Self {
            active: false,
            error_description: Some(error_description.into()),
            ..Self::default()
        }
    }

    /// Map into a validation response.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidResponse` if an active introspection
    /// does not name the token owner.
    pub fn into_response(self) -> Result<OAuthValidationResponse, ValidationError> {
        if !self.active {
            let message = self
                .error_description
                .or(self.error)
                .unwrap_or_else(|| DEFAULT_INVALID_TOKEN_MESSAGE.to_string());
            return Ok(OAuthValidationResponse::invalid(message));
        }

        let username = self.username.ok_or_else(|| {
            ValidationError::InvalidResponse("active token without username".to_string())
        })?;

        Ok(OAuthValidationResponse::valid(
            username,
            self.tenant_domain.unwrap_or_default(),
        ))
    }
}

/// Reject tokens that cannot be valid before asking the authority.
///
/// Returns the invalid response to hand back, or `None` to proceed.
pub(crate) fn precheck(token: &str) -> Option<OAuthValidationResponse> {
    if token.is_empty() {
        tracing::debug!(target: "webapp_auth.validator", "Empty bearer token");
        return Some(OAuthValidationResponse::invalid(DEFAULT_INVALID_TOKEN_MESSAGE));
    }
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: "webapp_auth.validator",
            token_size = token.len(),
            max_size = MAX_TOKEN_SIZE_BYTES,
            "Bearer token rejected: size exceeds maximum"
        );
        return Some(OAuthValidationResponse::invalid(DEFAULT_INVALID_TOKEN_MESSAGE));
    }
    None
}

/// Validates opaque bearer tokens.
///
/// Implementations are shared across concurrent requests for the lifetime of
/// the process.
#[async_trait::async_trait]
pub trait TokenValidator: Send + Sync {
    /// Check a bearer token.
    ///
    /// # Errors
    ///
    /// Only when the check itself could not be completed. A rejected token is
    /// `Ok` with `is_valid() == false`.
    async fn check(&self, token: &str) -> Result<OAuthValidationResponse, ValidationError>;

    /// The implementation in effect.
    fn kind(&self) -> ValidatorKind;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_response_accessors() {
        let r = OAuthValidationResponse::valid("alice", "acme.com");
        assert!(r.is_valid());
        assert_eq!(r.user_name(), Some("alice"));
        assert_eq!(r.tenant_domain(), Some("acme.com"));
        assert!(r.error_msg().is_none());
    }

    #[test]
    fn test_invalid_response_has_no_identity() {
        let r = OAuthValidationResponse::invalid("expired");
        assert!(!r.is_valid());
        assert_eq!(r.error_msg(), Some("expired"));
        assert!(r.user_name().is_none());
        assert!(r.tenant_domain().is_none());
    }

    #[test]
    fn test_introspection_deserialization_active() {
        let json = r#"{"active": true, "username": "alice", "tenant_domain": "acme.com"}"#;
        let i: TokenIntrospection = serde_json::from_str(json).unwrap();
        assert_eq!(i, TokenIntrospection::active("alice", "acme.com"));
    }

    #[test]
    fn test_introspection_deserialization_ignores_unknown_fields() {
        let json = r#"{"active": false, "scope": "openid", "exp": 1700000000}"#;
        let i: TokenIntrospection = serde_json::from_str(json).unwrap();
        assert!(!i.active);
        assert!(i.username.is_none());
    }

    #[test]
    fn test_inactive_message_precedence() {
        let described = TokenIntrospection {
            error: Some("invalid_token".to_string()),
            error_description: Some("Access token expired".to_string()),
            ..TokenIntrospection::default()
        };
        assert_eq!(
            described.into_response().unwrap().error_msg(),
            Some("Access token expired")
        );

        let coded = TokenIntrospection {
            error: Some("invalid_token".to_string()),
            ..TokenIntrospection::default()
        };
        assert_eq!(coded.into_response().unwrap().error_msg(), Some("invalid_token"));

        let bare = TokenIntrospection::default();
        assert_eq!(
            bare.into_response().unwrap().error_msg(),
            Some(DEFAULT_INVALID_TOKEN_MESSAGE)
        );
    }

    #[test]
    fn test_active_without_username_is_invalid_response() {
        let i = TokenIntrospection {
            active: true,
            tenant_domain: Some("acme.com".to_string()),
            ..TokenIntrospection::default()
        };
        assert!(matches!(
            i.into_response(),
            Err(ValidationError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_active_identity_reported_verbatim() {
        let r = TokenIntrospection::active("Alice@Partner.org", "ACME.com")
            .into_response()
            .unwrap();
        assert_eq!(r.user_name(), Some("Alice@Partner.org"));
        assert_eq!(r.tenant_domain(), Some("ACME.com"));
    }

    #[test]
    fn test_precheck() {
        assert!(precheck("abc").is_none());
        assert!(!precheck("").unwrap().is_valid());

        let oversized = "a".repeat(MAX_TOKEN_SIZE_BYTES + 1);
        assert!(!precheck(&oversized).unwrap().is_valid());

        let at_limit = "a".repeat(MAX_TOKEN_SIZE_BYTES);
        assert!(precheck(&at_limit).is_none());
    }
}
