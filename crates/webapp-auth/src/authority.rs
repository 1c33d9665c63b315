//! Co-located token authorities used by the local validator.
//!
//! When the authenticator runs in the same process as the token issuer there
//! is no network hop: the [`LocalTokenValidator`] asks a [`TokenAuthority`]
//! directly. [`InMemoryTokenAuthority`] is a self-contained authority that
//! keeps issued tokens in memory, keyed by SHA-256 fingerprint so raw bearer
//! tokens are never retained.
//!
//! [`LocalTokenValidator`]: crate::validator::LocalTokenValidator

use crate::validator::{TokenIntrospection, ValidationError};
use chrono::{DateTime, Duration, Utc};
use ring::digest::{digest, SHA256};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Message reported for a token past its expiry.
pub const EXPIRED_TOKEN_MESSAGE: &str = "Access token expired";

/// Message reported for a token the authority does not know.
pub const UNKNOWN_TOKEN_MESSAGE: &str = "Invalid access token";

/// In-process source of truth for token state.
#[async_trait::async_trait]
pub trait TokenAuthority: Send + Sync {
    /// Introspect a bearer token.
    ///
    /// # Errors
    ///
    /// Only when the authority itself is unavailable. Unknown or expired
    /// tokens are reported as inactive.
    async fn introspect(&self, token: &str) -> Result<TokenIntrospection, ValidationError>;
}

#[derive(Debug, Clone)]
struct TokenRecord {
    username: String,
    tenant_domain: String,
    expires_at: DateTime<Utc>,
}

/// Token authority holding registered tokens in memory.
#[derive(Debug, Default)]
pub struct InMemoryTokenAuthority {
    tokens: RwLock<HashMap<String, TokenRecord>>,
}

impl InMemoryTokenAuthority {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token issued to `username` in `tenant_domain`, valid for `ttl`.
    pub async fn register(
        &self,
        token: &str,
        username: impl Into<String>,
        tenant_domain: impl Into<String>,
        ttl: Duration,
    ) {
        let record = TokenRecord {
            username: username.into(),
            tenant_domain: tenant_domain.into(),
            expires_at: Utc::now() + ttl,
        };
        self.tokens.write().await.insert(fingerprint(token), record);
    }

    /// Revoke a token. Returns `true` if it was registered.
    pub async fn revoke(&self, token: &str) -> bool {
        self.tokens.write().await.remove(&fingerprint(token)).is_some()
    }

    /// Drop every token whose expiry has passed. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, record| record.expires_at > now);
        before - tokens.len()
    }

    /// Number of registered tokens, expired ones included.
    pub async fn token_count(&self) -> usize {
        self.tokens.read().await.len()
    }
}

#[async_trait::async_trait]
impl TokenAuthority for InMemoryTokenAuthority {
    #[instrument(skip_all)]
    async fn introspect(&self, token: &str) -> Result<TokenIntrospection, ValidationError> {
        let tokens = self.tokens.read().await;

        let Some(record) = tokens.get(&fingerprint(token)) else {
            debug!(target: "webapp_auth.authority", "Unknown access token");
            return Ok(TokenIntrospection::inactive(UNKNOWN_TOKEN_MESSAGE));
        };

        if record.expires_at <= Utc::now() {
            debug!(
                target: "webapp_auth.authority",
                expired_at = %record.expires_at,
                "Access token expired"
            );
            return Ok(TokenIntrospection::inactive(EXPIRED_TOKEN_MESSAGE));
        }

        Ok(TokenIntrospection::active(
            record.username.clone(),
            record.tenant_domain.clone(),
        ))
    }
}

/// Hex-encoded SHA-256 of the token.
fn fingerprint(token: &str) -> String {
    hex::encode(digest(&SHA256, token.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registered_token_is_active() {
        let authority = InMemoryTokenAuthority::new();
        authority
            .register("tok-1", "alice", "acme.com", Duration::minutes(5))
            .await;

        let result = authority.introspect("tok-1").await.unwrap();
        assert_eq!(result, TokenIntrospection::active("alice", "acme.com"));
    }

    #[tokio::test]
    async fn test_unknown_token_is_inactive() {
        let authority = InMemoryTokenAuthority::new();
        let result = authority.introspect("nope").await.unwrap();
        assert!(!result.active);
        assert_eq!(result.error_description.as_deref(), Some(UNKNOWN_TOKEN_MESSAGE));
    }

    #[tokio::test]
    async fn test_expired_token_is_inactive() {
        let authority = InMemoryTokenAuthority::new();
        authority
            .register("old", "alice", "acme.com", Duration::seconds(-1))
            .await;

        let result = authority.introspect("old").await.unwrap();
        assert!(!result.active);
        assert_eq!(result.error_description.as_deref(), Some(EXPIRED_TOKEN_MESSAGE));
        assert!(result.username.is_none());
    }

    #[tokio::test]
    async fn test_revoked_token_is_inactive() {
        let authority = InMemoryTokenAuthority::new();
        authority
            .register("tok", "bob", "acme.com", Duration::minutes(5))
            .await;

        assert!(authority.revoke("tok").await);
        assert!(!authority.revoke("tok").await);
        assert!(!authority.introspect("tok").await.unwrap().active);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let authority = InMemoryTokenAuthority::new();
        authority
            .register("live", "alice", "acme.com", Duration::minutes(5))
            .await;
        authority
            .register("dead", "bob", "acme.com", Duration::seconds(-5))
            .await;

        assert_eq!(authority.token_count().await, 2);
        assert_eq!(authority.purge_expired().await, 1);
        assert_eq!(authority.token_count().await, 1);
        assert!(authority.introspect("live").await.unwrap().active);
    }

    #[test]
    fn test_fingerprint_does_not_contain_token() {
        let fp = fingerprint("raw-bearer-token");
        assert_eq!(fp.len(), 64);
        assert!(!fp.contains("raw-bearer-token"));
        assert_eq!(fp, fingerprint("raw-bearer-token"));
    }
}
