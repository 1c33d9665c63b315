//! OAuth2 bearer-token validation for webapp authenticators.
//!
//! Builds a token validator from authenticator properties, checks bearer
//! tokens with it, and turns the result into an [`AuthenticationInfo`]
//! carrying tenant-qualified identity.
//!
//! ```rust,ignore
//! use webapp_auth::{OAuthAuthenticator, TenantResolver, ValidatorFactory};
//! use webapp_auth::settings::EnvSettings;
//!
//! // Once, at startup
//! let validator = ValidatorFactory::new().build_from_properties(Some(&props), &EnvSettings)?;
//! let authenticator = OAuthAuthenticator::new(validator, TenantResolver::new(directory));
//!
//! // Per request
//! let info = authenticator.authenticate_header(request_authorization).await?;
//! ```

#![warn(clippy::pedantic)]

/// Canonical authentication result and its builder
pub mod auth_info;

/// Bearer-token authenticator tying validation and tenant resolution together
pub mod authenticator;

/// Co-located token authorities for local validation
pub mod authority;

/// Validator configuration from authenticator properties
pub mod config;

/// Per-request error type
pub mod error;

/// Secret types that prevent accidental logging
pub mod secret;

/// Settings providers and `${name}` placeholder expansion
pub mod settings;

/// Tenant domain / id resolution
pub mod tenant;

/// Token validator trait, variants and factory
pub mod validator;

pub use auth_info::{AuthenticationInfo, Status};
pub use authenticator::OAuthAuthenticator;
pub use config::{ConfigError, ValidatorConfig};
pub use error::AuthError;
pub use tenant::{TenantDirectory, TenantLookupError, TenantResolver};
pub use validator::{
    OAuthValidationResponse, TokenValidator, ValidationError, ValidatorFactory, ValidatorKind,
};
