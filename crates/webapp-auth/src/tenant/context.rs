//! Task-scoped tenant flow.
//!
//! Directory lookups that operate on a specific tenant run inside a tenant
//! flow. The flow is bound to the current task for the duration of one future
//! via [`scope`] and is released when that future completes, returns an
//! error, or is dropped. Concurrent requests on the same worker thread each
//! see only their own flow.

use std::future::Future;

tokio::task_local! {
    static TENANT_FLOW: TenantFlow;
}

/// Tenant a directory lookup is operating against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantFlow {
    tenant_id: i32,
}

impl TenantFlow {
    #[must_use]
    pub fn for_tenant(tenant_id: i32) -> Self {
        Self { tenant_id }
    }

    #[must_use]
    pub fn tenant_id(&self) -> i32 {
        self.tenant_id
    }
}

/// Run `future` with `flow` established as the current tenant flow.
///
/// An enclosing flow, if any, is shadowed for the duration and visible again
/// afterwards.
pub async fn scope<F>(flow: TenantFlow, future: F) -> F::Output
where
    F: Future,
{
    tracing::trace!(
        target: "webapp_auth.tenant.context",
        tenant_id = flow.tenant_id,
        "Tenant flow started"
    );
    let output = TENANT_FLOW.scope(flow, future).await;
    tracing::trace!(target: "webapp_auth.tenant.context", "Tenant flow ended");
    output
}

/// The tenant flow of the current task, if one is established.
#[must_use]
pub fn current() -> Option<TenantFlow> {
    TENANT_FLOW.try_with(Clone::clone).ok()
}
