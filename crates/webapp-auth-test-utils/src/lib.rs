//! # webapp-auth Test Utilities
//!
//! Mocks and fixtures for testing token validation without real
//! infrastructure.
//!
//! ## Modules
//!
//! - `fixtures` - fixed credentials and authenticator properties
//! - `introspection_server` - wiremock-backed token introspection endpoint
//! - `mock_directory` - configurable tenant directory that records calls
//!
//! ## Usage
//!
//! ```rust,ignore
//! use webapp_auth_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let server = TestIntrospectionServer::start().await;
//!     server.with_active_token("tok", "alice", "acme.com").await;
//!
//!     let validator = ValidatorFactory::new()
//!         .build_from_properties(Some(&remote_properties(&server.endpoint_url())), &no_settings())
//!         .unwrap();
//!
//!     let directory = MockTenantDirectory::builder().with_tenant("acme.com", 1).build();
//! }
//! ```

pub mod fixtures;
pub mod introspection_server;
pub mod mock_directory;

pub use fixtures::*;
pub use introspection_server::*;
pub use mock_directory::*;
