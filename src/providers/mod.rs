//! Collaborator traits and their production implementations.
//!
//! The engine never names a concrete store or HTTP client: CSRF tokens,
//! session documents, user lookup, JWT verification, and the token exchange
//! are all injected behind the traits in this module.

pub mod csrf;
pub mod jwt;
pub mod session;
pub mod token_exchange;
pub mod user;

pub use csrf::{CsrfTokenStore, new_csrf_token};
pub use jwt::{JwtVerifier, StaticKeyVerifier};
pub use session::SessionStore;
pub use token_exchange::{HttpTokenExchanger, TokenExchanger, TokenResponse};
pub use user::UserDirectory;
