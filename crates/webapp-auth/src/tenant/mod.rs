//! Tenant resolution.
//!
//! Maps tenant domains to numeric tenant ids and back through an external
//! [`TenantDirectory`]. Usernames may be tenant-qualified (`alice@acme.com`);
//! a bare username belongs to the default tenant, id [`DEFAULT_TENANT_ID`].
//!
//! # Components
//!
//! - `context` - task-scoped tenant flow used around directory lookups
//! - `directory` - static in-memory directory

pub mod context;
pub mod directory;

pub use context::TenantFlow;
pub use directory::StaticTenantDirectory;

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, instrument};

/// Tenant id of the default (super) tenant.
pub const DEFAULT_TENANT_ID: i32 = 0;

/// Errors reported by a tenant directory.
#[derive(Error, Debug, Clone)]
pub enum DirectoryError {
    /// No tenant matches the lookup key.
    #[error("Tenant not found: {0}")]
    NotFound(String),

    /// The backing store failed.
    #[error("Tenant store error: {0}")]
    Store(String),

    /// A directory definition could not be parsed.
    #[error("Malformed tenant directory definition: {0}")]
    Malformed(String),
}

/// Errors surfaced by the [`TenantResolver`].
#[derive(Error, Debug)]
pub enum TenantLookupError {
    #[error("Tenant directory service is not initialized")]
    NotInitialized,

    #[error("Error when getting the tenant id from the tenant domain : {domain}")]
    TenantId {
        domain: String,
        #[source]
        source: DirectoryError,
    },

    #[error("Error when getting the tenant domain of tenant id : {tenant_id}")]
    Domain {
        tenant_id: i32,
        #[source]
        source: DirectoryError,
    },
}

/// External tenant directory (realm/tenant manager).
#[async_trait::async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Resolve a tenant domain to its tenant id.
    async fn tenant_id(&self, domain: &str) -> Result<i32, DirectoryError>;

    /// Resolve a tenant id to its tenant domain.
    async fn domain(&self, tenant_id: i32) -> Result<String, DirectoryError>;
}

/// Domain suffix of a tenant-qualified username.
///
/// The domain is the text after the last `@`. `None` for a bare username or
/// an empty suffix.
#[must_use]
pub fn tenant_domain_of(username: &str) -> Option<&str> {
    username
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .filter(|domain| !domain.is_empty())
}

/// Resolves tenant identity through a [`TenantDirectory`].
#[derive(Clone, Default)]
pub struct TenantResolver {
    directory: Option<Arc<dyn TenantDirectory>>,
}

impl std::fmt::Debug for TenantResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantResolver")
            .field("initialized", &self.directory.is_some())
            .finish()
    }
}

impl TenantResolver {
    #[must_use]
    pub fn new(directory: Arc<dyn TenantDirectory>) -> Self {
        Self {
            directory: Some(directory),
        }
    }

    /// A resolver whose directory service has not been wired up yet.
    #[must_use]
    pub fn uninitialized() -> Self {
        Self::default()
    }

    /// Tenant id of the tenant a (possibly qualified) username belongs to.
    ///
    /// A bare username resolves to [`DEFAULT_TENANT_ID`] without consulting
    /// the directory.
    ///
    /// # Errors
    ///
    /// - `TenantLookupError::NotInitialized` if a domain is present but no
    ///   directory is available
    /// - `TenantLookupError::TenantId` if the directory lookup fails
    #[instrument(skip_all)]
    pub async fn tenant_id_for_user(&self, username: &str) -> Result<i32, TenantLookupError> {
        let Some(domain) = tenant_domain_of(username) else {
            return Ok(DEFAULT_TENANT_ID);
        };

        let directory = self.directory.as_ref().ok_or_else(|| {
            error!(
                target: "webapp_auth.tenant",
                domain = %domain,
                "Tenant directory service is not initialized"
            );
            TenantLookupError::NotInitialized
        })?;

        directory.tenant_id(domain).await.map_err(|source| {
            error!(
                target: "webapp_auth.tenant",
                domain = %domain,
                error = %source,
                "Error when getting the tenant id from the tenant domain"
            );
            TenantLookupError::TenantId {
                domain: domain.to_string(),
                source,
            }
        })
    }

    /// Tenant domain for a tenant id.
    ///
    /// The lookup runs inside a tenant flow for `tenant_id` which is released
    /// on every exit path.
    ///
    /// # Errors
    ///
    /// - `TenantLookupError::NotInitialized` if no directory is available
    /// - `TenantLookupError::Domain` if the directory lookup fails
    #[instrument(skip(self))]
    pub async fn domain_for_tenant_id(&self, tenant_id: i32) -> Result<String, TenantLookupError> {
        context::scope(TenantFlow::for_tenant(tenant_id), async {
            let directory = self.directory.as_ref().ok_or_else(|| {
                error!(
                    target: "webapp_auth.tenant",
                    "Tenant directory service is not initialized"
                );
                TenantLookupError::NotInitialized
            })?;

            directory.domain(tenant_id).await.map_err(|source| {
                error!(
                    target: "webapp_auth.tenant",
                    tenant_id,
                    error = %source,
                    "Tenant store error while resolving tenant domain"
                );
                TenantLookupError::Domain { tenant_id, source }
            })
        })
        .await
    }
}
