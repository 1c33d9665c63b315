//! token-check
//!
//! Builds the token validator from environment configuration, checks the
//! bearer token given as the first argument, and prints the resulting
//! authentication info as JSON. Exits non-zero unless the token is accepted.

use anyhow::{bail, Context};
use chrono::Duration;
use std::collections::HashMap;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webapp_auth::authority::InMemoryTokenAuthority;
use webapp_auth::config::{
    Properties, PROP_ENDPOINT_URL, PROP_IS_REMOTE, PROP_MAX_CONNECTIONS_PER_HOST,
    PROP_MAX_TOTAL_CONNECTIONS, PROP_PASSWORD, PROP_USERNAME,
};
use webapp_auth::settings::EnvSettings;
use webapp_auth::tenant::StaticTenantDirectory;
use webapp_auth::{OAuthAuthenticator, Status, TenantResolver, ValidatorFactory};

/// Environment variable → authenticator property.
const PROPERTY_ENV_VARS: &[(&str, &str)] = &[
    ("TOKEN_VALIDATION_ENDPOINT_URL", PROP_ENDPOINT_URL),
    ("TOKEN_VALIDATION_USERNAME", PROP_USERNAME),
    ("TOKEN_VALIDATION_PASSWORD", PROP_PASSWORD),
    ("TOKEN_VALIDATION_IS_REMOTE", PROP_IS_REMOTE),
    ("TOKEN_VALIDATION_MAX_TOTAL_CONNECTIONS", PROP_MAX_TOTAL_CONNECTIONS),
    (
        "TOKEN_VALIDATION_MAX_CONNECTIONS_PER_HOST",
        PROP_MAX_CONNECTIONS_PER_HOST,
    ),
];

/// Lifetime of tokens preloaded into the local authority.
const LOCAL_TOKEN_TTL_MINUTES: i64 = 60;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webapp_auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(token) = env::args().nth(1) else {
        bail!("usage: token-check <bearer-token>");
    };

    let vars: HashMap<String, String> = env::vars().collect();

    let authority = Arc::new(InMemoryTokenAuthority::new());
    if let Some(definition) = vars.get("LOCAL_TOKENS") {
        for (local_token, username, tenant_domain) in parse_local_tokens(definition)? {
            authority
                .register(
                    &local_token,
                    username,
                    tenant_domain,
                    Duration::minutes(LOCAL_TOKEN_TTL_MINUTES),
                )
                .await;
        }
    }

    let properties = properties_from_vars(&vars);
    let validator = ValidatorFactory::new()
        .with_local_authority(authority)
        .build_from_properties(Some(&properties), &EnvSettings)
        .map_err(|e| {
            error!("Failed to initialize token validator: {}", e);
            e
        })?;

    let directory: StaticTenantDirectory = vars
        .get("TENANTS")
        .map(String::as_str)
        .unwrap_or_default()
        .parse()
        .context("invalid TENANTS definition")?;

    info!(
        validator = ?validator.kind(),
        tenants = directory.len(),
        "Token validator ready"
    );

    let authenticator =
        OAuthAuthenticator::new(validator, TenantResolver::new(Arc::new(directory)));
    let auth_info = authenticator.authenticate(&token).await.map_err(|e| {
        error!("Authentication could not be completed: {}", e);
        e
    })?;

    println!("{}", serde_json::to_string_pretty(&auth_info)?);

    Ok(if auth_info.status == Some(Status::Continue) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Collect authenticator properties from environment variables.
fn properties_from_vars(vars: &HashMap<String, String>) -> Properties {
    PROPERTY_ENV_VARS
        .iter()
        .filter_map(|(var, prop)| vars.get(*var).map(|v| ((*prop).to_string(), v.clone())))
        .collect()
}

/// Parse `"token=user@domain,..."` into `(token, user, domain)` triples.
fn parse_local_tokens(definition: &str) -> anyhow::Result<Vec<(String, String, String)>> {
    definition
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (token, owner) = entry
                .split_once('=')
                .with_context(|| format!("expected token=user@domain, got '{entry}'"))?;
            let (user, domain) = owner
                .rsplit_once('@')
                .with_context(|| format!("expected user@domain, got '{owner}'"))?;
            Ok((token.to_string(), user.to_string(), domain.to_string()))
        })
        .collect()
}
