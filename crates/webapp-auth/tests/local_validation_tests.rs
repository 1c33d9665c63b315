//! Local token validation and tenant resolution integration tests.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::Duration;
use std::sync::Arc;
use webapp_auth::authority::InMemoryTokenAuthority;
use webapp_auth::tenant::context::{self, TenantFlow};
use webapp_auth::{
    AuthError, OAuthAuthenticator, Status, TenantLookupError, TenantResolver, ValidationError,
    ValidatorFactory, ValidatorKind,
};
use webapp_auth_test_utils::{local_properties, no_settings, MockTenantDirectory};

async fn local_authenticator(
    directory: Arc<MockTenantDirectory>,
) -> (Arc<InMemoryTokenAuthority>, OAuthAuthenticator) {
    let authority = Arc::new(InMemoryTokenAuthority::new());
    let validator = ValidatorFactory::new()
        .with_local_authority(authority.clone())
        .build_from_properties(Some(&local_properties()), &no_settings())
        .unwrap();
    assert_eq!(validator.kind(), ValidatorKind::Local);

    (authority, OAuthAuthenticator::new(validator, TenantResolver::new(directory)))
}

#[tokio::test]
async fn test_local_validator_builds_from_complete_config_without_authority() {
    let validator = ValidatorFactory::new()
        .build_from_properties(Some(&local_properties()), &no_settings())
        .unwrap();
    assert_eq!(validator.kind(), ValidatorKind::Local);

    let authenticator = OAuthAuthenticator::new(
        validator,
        TenantResolver::new(Arc::new(MockTenantDirectory::default())),
    );
    let result = authenticator.authenticate("session-1").await;
    assert!(matches!(
        result,
        Err(AuthError::Validation(ValidationError::Transport(_)))
    ));
}

#[tokio::test]
async fn test_local_token_lifecycle() {
    let directory = Arc::new(
        MockTenantDirectory::builder()
            .with_tenant("acme.com", 3)
            .build(),
    );
    let (authority, authenticator) = local_authenticator(directory).await;

    authority
        .register("session-1", "carol", "acme.com", Duration::minutes(5))
        .await;

    let info = authenticator.authenticate("session-1").await.unwrap();
    assert_eq!(info.status, Some(Status::Continue));
    assert_eq!(info.username.as_deref(), Some("carol"));
    assert_eq!(info.tenant_id, 3);

    assert!(authority.revoke("session-1").await);

    let info = authenticator.authenticate("session-1").await.unwrap();
    assert_eq!(info.status, Some(Status::Failure));
    assert!(info.username.is_none());
}

#[tokio::test]
async fn test_expired_local_token_fails() {
    let (authority, authenticator) =
        local_authenticator(Arc::new(MockTenantDirectory::default())).await;

    authority
        .register("old", "dave", "acme.com", Duration::seconds(-1))
        .await;

    let info = authenticator.authenticate("old").await.unwrap();
    assert_eq!(info.status, Some(Status::Failure));
    assert!(info.message.is_some());
}

#[tokio::test]
async fn test_oversized_token_never_reaches_authority() {
    let directory = Arc::new(MockTenantDirectory::default());
    let (_authority, authenticator) = local_authenticator(directory.clone()).await;

    let token = "a".repeat(8193);
    let info = authenticator.authenticate(&token).await.unwrap();

    assert_eq!(info.status, Some(Status::Failure));
    assert_eq!(directory.call_count(), 0);
}

#[tokio::test]
async fn test_domain_lookup_runs_inside_tenant_flow() {
    let directory = Arc::new(
        MockTenantDirectory::builder()
            .with_tenant("acme.com", 9)
            .build(),
    );
    let resolver = TenantResolver::new(directory.clone());

    let domain = resolver.domain_for_tenant_id(9).await.unwrap();

    assert_eq!(domain, "acme.com");
    assert_eq!(directory.observed_flows(), vec![Some(TenantFlow::for_tenant(9))]);
    assert!(context::current().is_none());
}

#[tokio::test]
async fn test_tenant_flow_released_after_failed_lookup() {
    let directory = Arc::new(MockTenantDirectory::failing());
    let resolver = TenantResolver::new(directory.clone());

    let result = resolver.domain_for_tenant_id(5).await;

    assert!(matches!(
        result,
        Err(TenantLookupError::Domain { tenant_id: 5, .. })
    ));
    assert_eq!(directory.observed_flows(), vec![Some(TenantFlow::for_tenant(5))]);
    assert!(context::current().is_none());
}

#[tokio::test]
async fn test_tenant_id_lookup_has_no_flow() {
    let directory = Arc::new(
        MockTenantDirectory::builder()
            .with_tenant("acme.com", 2)
            .build(),
    );
    let resolver = TenantResolver::new(directory.clone());

    assert_eq!(resolver.tenant_id_for_user("erin@acme.com").await.unwrap(), 2);
    assert_eq!(resolver.tenant_id_for_user("erin").await.unwrap(), 0);
    assert_eq!(directory.call_count(), 1);
    assert_eq!(directory.observed_flows(), vec![None]);
}

#[tokio::test]
async fn test_concurrent_domain_lookups_see_their_own_flow() {
    let directory = Arc::new(
        MockTenantDirectory::builder()
            .with_tenant("a.com", 1)
            .with_tenant("b.com", 2)
            .with_tenant("c.com", 3)
            .build(),
    );
    let resolver = TenantResolver::new(directory.clone());

    let (a, b, c) = tokio::join!(
        resolver.domain_for_tenant_id(1),
        resolver.domain_for_tenant_id(2),
        resolver.domain_for_tenant_id(3),
    );

    assert_eq!(a.unwrap(), "a.com");
    assert_eq!(b.unwrap(), "b.com");
    assert_eq!(c.unwrap(), "c.com");

    let mut seen: Vec<i32> = directory
        .observed_flows()
        .into_iter()
        .map(|flow| flow.unwrap().tenant_id())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2, 3]);
}
