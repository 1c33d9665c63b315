//! Per-request authentication errors.

use crate::tenant::TenantLookupError;
use crate::validator::ValidationError;
use thiserror::Error;

/// Errors that can occur while authenticating one request.
///
/// A rejected token is not an error; it yields an `AuthenticationInfo` with
/// `Status::Failure`. These variants mean the outcome could not be decided.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The token check could not be completed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The token was valid but its tenant could not be resolved.
    #[error(transparent)]
    TenantLookup(#[from] TenantLookupError),
}

/// Result type alias using `AuthError`
pub type Result<T> = std::result::Result<T, AuthError>;
