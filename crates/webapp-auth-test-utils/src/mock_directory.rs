//! Mock tenant directory.
//!
//! A [`TenantDirectory`] that can be configured to:
//! - Resolve a fixed set of tenants
//! - Fail every lookup with a store error
//! - Record each call and the tenant flow active during it
//!
//! # Example
//!
//! ```rust,ignore
//! use webapp_auth_test_utils::MockTenantDirectory;
//!
//! let directory = MockTenantDirectory::builder()
//!     .with_tenant("acme.com", 1)
//!     .build();
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use webapp_auth::tenant::context::{self, TenantFlow};
use webapp_auth::tenant::{DirectoryError, TenantDirectory};

/// Mock tenant directory for resolver and builder tests.
#[derive(Debug, Default)]
pub struct MockTenantDirectory {
    tenants: HashMap<String, i32>,
    fail: bool,
    call_count: AtomicUsize,
    observed_flows: Mutex<Vec<Option<TenantFlow>>>,
}

impl MockTenantDirectory {
    /// Create a MockTenantDirectory builder.
    #[must_use]
    pub fn builder() -> MockTenantDirectoryBuilder {
        MockTenantDirectoryBuilder::default()
    }

    /// A directory whose every lookup fails.
    #[must_use]
    pub fn failing() -> Self {
        Self::builder().failing().build()
    }

    /// Number of lookups made.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Tenant flow active during each lookup, in call order.
    pub fn observed_flows(&self) -> Vec<Option<TenantFlow>> {
        self.observed_flows.lock().unwrap().clone()
    }

    fn record(&self) {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.observed_flows.lock().unwrap().push(context::current());
    }
}

#[async_trait::async_trait]
impl TenantDirectory for MockTenantDirectory {
    async fn tenant_id(&self, domain: &str) -> Result<i32, DirectoryError> {
        self.record();
        if self.fail {
            return Err(DirectoryError::Store("mock directory failure".to_string()));
        }
        self.tenants
            .get(domain)
            .copied()
            .ok_or_else(|| DirectoryError::NotFound(domain.to_string()))
    }

    async fn domain(&self, tenant_id: i32) -> Result<String, DirectoryError> {
        self.record();
        if self.fail {
            return Err(DirectoryError::Store("mock directory failure".to_string()));
        }
        self.tenants
            .iter()
            .find(|(_, id)| **id == tenant_id)
            .map(|(domain, _)| domain.clone())
            .ok_or_else(|| DirectoryError::NotFound(tenant_id.to_string()))
    }
}

/// Builder for MockTenantDirectory configuration.
#[derive(Debug, Default)]
pub struct MockTenantDirectoryBuilder {
    tenants: HashMap<String, i32>,
    fail: bool,
}

impl MockTenantDirectoryBuilder {
    /// Add a tenant.
    #[must_use]
    pub fn with_tenant(mut self, domain: &str, tenant_id: i32) -> Self {
        self.tenants.insert(domain.to_string(), tenant_id);
        self
    }

    /// Fail every lookup.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Build the MockTenantDirectory.
    #[must_use]
    pub fn build(self) -> MockTenantDirectory {
        MockTenantDirectory {
            tenants: self.tenants,
            fail: self.fail,
            ..MockTenantDirectory::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builder_tenants_resolve() {
        let dir = MockTenantDirectory::builder()
            .with_tenant("acme.com", 4)
            .build();

        assert_eq!(dir.tenant_id("acme.com").await.unwrap(), 4);
        assert_eq!(dir.domain(4).await.unwrap(), "acme.com");
        assert_eq!(dir.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_directory() {
        let dir = MockTenantDirectory::failing();
        assert!(dir.tenant_id("acme.com").await.is_err());
        assert!(dir.domain(1).await.is_err());
        assert_eq!(dir.observed_flows(), vec![None, None]);
    }
}
