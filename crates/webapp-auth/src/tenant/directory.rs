//! Static in-memory tenant directory.

use super::{DirectoryError, TenantDirectory};
use std::collections::HashMap;
use std::str::FromStr;

/// Tenant directory backed by a fixed domain ↔ id table.
///
/// Domains are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticTenantDirectory {
    by_domain: HashMap<String, i32>,
    by_id: HashMap<i32, String>,
}

impl StaticTenantDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tenant.
    ///
    /// A later entry for the same domain or the same id replaces the earlier
    /// one in both directions.
    #[must_use]
    pub fn with_tenant(mut self, domain: &str, tenant_id: i32) -> Self {
        let domain = domain.to_ascii_lowercase();
        if let Some(old_id) = self.by_domain.remove(&domain) {
            self.by_id.remove(&old_id);
        }
        if let Some(old_domain) = self.by_id.remove(&tenant_id) {
            self.by_domain.remove(&old_domain);
        }
        self.by_id.insert(tenant_id, domain.clone());
        self.by_domain.insert(domain, tenant_id);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_domain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_domain.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, i32)> for StaticTenantDirectory {
    fn from_iter<T: IntoIterator<Item = (&'a str, i32)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |dir, (domain, id)| dir.with_tenant(domain, id))
    }
}

/// Parses `"acme.com=1,partner.org=2"`. Whitespace around entries is ignored.
impl FromStr for StaticTenantDirectory {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .try_fold(Self::new(), |dir, entry| {
                let (domain, id) = entry.split_once('=').ok_or_else(|| {
                    DirectoryError::Malformed(format!("expected domain=id, got '{entry}'"))
                })?;
                let domain = domain.trim();
                if domain.is_empty() {
                    return Err(DirectoryError::Malformed(format!(
                        "empty tenant domain in '{entry}'"
                    )));
                }
                let id: i32 = id.trim().parse().map_err(|e| {
                    DirectoryError::Malformed(format!("invalid tenant id in '{entry}': {e}"))
                })?;
                Ok(dir.with_tenant(domain, id))
            })
    }
}

#[async_trait::async_trait]
impl TenantDirectory for StaticTenantDirectory {
    async fn tenant_id(&self, domain: &str) -> Result<i32, DirectoryError> {
        self.by_domain
            .get(&domain.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| DirectoryError::NotFound(domain.to_string()))
    }

    async fn domain(&self, tenant_id: i32) -> Result<String, DirectoryError> {
        self.by_id
            .get(&tenant_id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(tenant_id.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_both_directions() {
        let dir = StaticTenantDirectory::new()
            .with_tenant("acme.com", 1)
            .with_tenant("partner.org", 2);

        assert_eq!(dir.tenant_id("acme.com").await.unwrap(), 1);
        assert_eq!(dir.tenant_id("ACME.com").await.unwrap(), 1);
        assert_eq!(dir.domain(2).await.unwrap(), "partner.org");
    }

    #[tokio::test]
    async fn test_unknown_entries() {
        let dir = StaticTenantDirectory::new().with_tenant("acme.com", 1);
        assert!(matches!(
            dir.tenant_id("nope.org").await,
            Err(DirectoryError::NotFound(_))
        ));
        assert!(matches!(dir.domain(99).await, Err(DirectoryError::NotFound(_))));
    }

    #[test]
    fn test_parse_definition() {
        let dir: StaticTenantDirectory = " acme.com=1 , partner.org = 2,".parse().unwrap();
        assert_eq!(dir.len(), 2);

        let empty: StaticTenantDirectory = "".parse().unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_parse_definition_rejects_malformed() {
        for bad in ["acme.com", "acme.com=x", "=3", "a=1,b"] {
            assert!(
                matches!(
                    bad.parse::<StaticTenantDirectory>(),
                    Err(DirectoryError::Malformed(_))
                ),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn test_from_iterator() {
        let dir: StaticTenantDirectory =
            [("acme.com", 1), ("partner.org", 2)].into_iter().collect();
        assert_eq!(dir.len(), 2);
    }

    #[tokio::test]
    async fn test_redefined_domain_replaces_old_id() {
        let dir: StaticTenantDirectory = "acme.com=1,acme.com=2".parse().unwrap();

        assert_eq!(dir.len(), 1);
        assert_eq!(dir.tenant_id("acme.com").await.unwrap(), 2);
        assert_eq!(dir.domain(2).await.unwrap(), "acme.com");
        assert!(matches!(dir.domain(1).await, Err(DirectoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reused_id_replaces_old_domain() {
        let dir = StaticTenantDirectory::new()
            .with_tenant("acme.com", 1)
            .with_tenant("partner.org", 1);

        assert_eq!(dir.len(), 1);
        assert_eq!(dir.domain(1).await.unwrap(), "partner.org");
        assert!(matches!(
            dir.tenant_id("acme.com").await,
            Err(DirectoryError::NotFound(_))
        ));
    }
}
