//! In-process token validation against a co-located authority.
//!
//! The authority is looked up when a token is checked, not when the validator
//! is built. A validator without an authority builds fine and reports every
//! non-trivial check as a transport failure.

use super::{precheck, OAuthValidationResponse, TokenValidator, ValidationError, ValidatorKind};
use crate::authority::TokenAuthority;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Validator that consults a [`TokenAuthority`] without a network hop.
#[derive(Clone)]
pub struct LocalTokenValidator {
    authority: Option<Arc<dyn TokenAuthority>>,
}

impl LocalTokenValidator {
    #[must_use]
    pub fn new(authority: Arc<dyn TokenAuthority>) -> Self {
        Self {
            authority: Some(authority),
        }
    }

    /// A validator with no co-located authority available.
    #[must_use]
    pub fn without_authority() -> Self {
        Self { authority: None }
    }
}

impl std::fmt::Debug for LocalTokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTokenValidator")
            .field("has_authority", &self.authority.is_some())
            .finish()
    }
}

#[async_trait::async_trait]
impl TokenValidator for LocalTokenValidator {
    #[instrument(skip_all)]
    async fn check(&self, token: &str) -> Result<OAuthValidationResponse, ValidationError> {
        if let Some(rejected) = precheck(token) {
            return Ok(rejected);
        }

        let authority = self.authority.as_ref().ok_or_else(|| {
            error!(
                target: "webapp_auth.validator.local",
                "Local token authority is not available"
            );
            ValidationError::Transport("local token authority is not available".to_string())
        })?;

        let introspection = authority.introspect(token).await.map_err(|e| {
            warn!(
                target: "webapp_auth.validator.local",
                error = %e,
                "Local token authority failed"
            );
            e
        })?;

        let response = introspection.into_response()?;
        debug!(
            target: "webapp_auth.validator.local",
            valid = response.is_valid(),
            "Token checked against local authority"
        );
        Ok(response)
    }

    fn kind(&self) -> ValidatorKind {
        ValidatorKind::Local
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::authority::{InMemoryTokenAuthority, EXPIRED_TOKEN_MESSAGE};
    use crate::validator::TokenIntrospection;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAuthority {
        calls: AtomicUsize,
        result: Result<TokenIntrospection, ValidationError>,
    }

    #[async_trait::async_trait]
    impl TokenAuthority for CountingAuthority {
        async fn introspect(&self, _token: &str) -> Result<TokenIntrospection, ValidationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn test_valid_token() {
        let authority = Arc::new(InMemoryTokenAuthority::new());
        authority
            .register("tok", "alice", "acme.com", Duration::minutes(5))
            .await;
        let validator = LocalTokenValidator::new(authority);

        let response = validator.check("tok").await.unwrap();
        assert!(response.is_valid());
        assert_eq!(response.user_name(), Some("alice"));
        assert_eq!(response.tenant_domain(), Some("acme.com"));
        assert_eq!(validator.kind(), ValidatorKind::Local);
    }

    #[tokio::test]
    async fn test_expired_token_is_not_an_error() {
        let authority = Arc::new(InMemoryTokenAuthority::new());
        authority
            .register("tok", "alice", "acme.com", Duration::seconds(-1))
            .await;
        let validator = LocalTokenValidator::new(authority);

        let response = validator.check("tok").await.unwrap();
        assert!(!response.is_valid());
        assert_eq!(response.error_msg(), Some(EXPIRED_TOKEN_MESSAGE));
    }

    #[tokio::test]
    async fn test_empty_token_skips_authority() {
        let authority = Arc::new(CountingAuthority {
            calls: AtomicUsize::new(0),
            result: Ok(TokenIntrospection::active("alice", "acme.com")),
        });
        let validator = LocalTokenValidator::new(authority.clone());

        let response = validator.check("").await.unwrap();
        assert!(!response.is_valid());
        assert_eq!(authority.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_authority_failure_propagates() {
        let authority = Arc::new(CountingAuthority {
            calls: AtomicUsize::new(0),
            result: Err(ValidationError::Transport("authority down".to_string())),
        });
        let validator = LocalTokenValidator::new(authority.clone());

        let result = validator.check("tok").await;
        assert!(matches!(result, Err(ValidationError::Transport(_))));
        assert_eq!(authority.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_authority_is_transport_error() {
        let validator = LocalTokenValidator::without_authority();

        let result = validator.check("tok").await;
        assert!(matches!(result, Err(ValidationError::Transport(_))));
        assert_eq!(validator.kind(), ValidatorKind::Local);
    }

    #[tokio::test]
    async fn test_missing_authority_still_prechecks() {
        let validator = LocalTokenValidator::without_authority();

        let response = validator.check("").await.unwrap();
        assert!(!response.is_valid());
    }
}
