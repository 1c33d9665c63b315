//! Secret types for credentials that must never reach the logs.
//!
//! Re-exports the [`secrecy`] types used for the admin password of the token
//! validation endpoint. `SecretString` implements `Debug` with redaction, so a
//! struct that derives `Debug` over it stays safe to log with `{:?}` or
//! through `tracing` fields.
//!
//! # Example
//!
//! ```rust
//! use webapp_auth::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct AdminCredentials {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let creds = AdminCredentials {
//!     username: "admin".to_string(),
//!     password: SecretString::from("admin-pass"),
//! };
//!
//! assert!(!format!("{creds:?}").contains("admin-pass"));
//! assert_eq!(creds.password.expose_secret(), "admin-pass");
//! ```
//!
//! Bearer tokens presented by clients are passed around as `&str` for the
//! duration of a single check and are never stored or logged.

pub use secrecy::{ExposeSecret, SecretString};
