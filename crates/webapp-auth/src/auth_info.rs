//! Canonical authentication result and the builder that populates it.
//!
//! [`AuthenticationInfo`] is created blank per request by the caller and is
//! populated only by [`apply`], which merges a token validation response
//! with tenant resolution.

use crate::tenant::{TenantLookupError, TenantResolver, DEFAULT_TENANT_ID};
use crate::validator::OAuthValidationResponse;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Decision handed back to the request pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Authentication completed and the request may be served.
    Success,
    /// Authentication failed; reject the request with the message.
    Failure,
    /// Authenticated; continue down the pipeline.
    Continue,
    /// Continue only if the resource is not secured.
    ContinueIfUnsecured,
}

/// Per-request authentication result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationInfo {
    /// Authenticated username, possibly tenant-qualified.
    pub username: Option<String>,

    /// Tenant domain of the authenticated user.
    pub tenant_domain: Option<String>,

    /// Resolved tenant id; 0 for the default tenant or when unresolved.
    pub tenant_id: i32,

    /// Outcome; `None` until populated.
    pub status: Option<Status>,

    /// Failure reason; set only when `status` is `Failure`.
    pub message: Option<String>,
}

impl Default for AuthenticationInfo {
    fn default() -> Self {
        Self {
            username: None,
            tenant_domain: None,
            tenant_id: DEFAULT_TENANT_ID,
            status: None,
            message: None,
        }
    }
}

impl AuthenticationInfo {
    /// A blank record for a new request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Populate `info` from a token validation response.
///
/// Valid token: username and tenant domain are copied verbatim, the tenant id
/// is resolved from `"{username}@{tenant_domain}"` and the status becomes
/// `Continue`. Invalid token: the message is copied, the status becomes
/// `Failure` and identity fields are left untouched.
///
/// # Errors
///
/// A tenant lookup failure on a valid token is returned as
/// `TenantLookupError` rather than downgraded to `Failure`, so directory
/// outages stay distinguishable from bad credentials.
#[instrument(skip_all)]
pub async fn apply<'a>(
    response: &OAuthValidationResponse,
    info: &'a mut AuthenticationInfo,
    resolver: &TenantResolver,
) -> Result<&'a mut AuthenticationInfo, TenantLookupError> {
    if !response.is_valid() {
        info.message = Some(response.error_msg().unwrap_or_default().to_string());
        info.status = Some(Status::Failure);
        debug!(target: "webapp_auth.auth_info", "Token rejected");
        return Ok(info);
    }

    let username = response.user_name().unwrap_or_default();
    let tenant_domain = response.tenant_domain().unwrap_or_default();

    let tenant_id = resolver
        .tenant_id_for_user(&format!("{username}@{tenant_domain}"))
        .await?;

    info.username = Some(username.to_string());
    info.tenant_domain = Some(tenant_domain.to_string());
    info.tenant_id = tenant_id;
    info.status = Some(Status::Continue);

    debug!(
        target: "webapp_auth.auth_info",
        tenant_domain = %tenant_domain,
        tenant_id,
        "Token accepted"
    );
    Ok(info)
}
