//! Mock collaborators for testing.
//!
//! Enabled by the default-on `test-utils` feature. The in-memory stores in
//! [`crate::stores`] double as the store fakes; this module covers the
//! remaining collaborators.

pub mod jwt;
pub mod token_exchange;
pub mod user;

pub use jwt::MockJwtVerifier;
pub use token_exchange::MockTokenExchanger;
pub use user::MockUserDirectory;
