//! # Aegis Auth
//!
//! An embeddable authentication core for web applications: it drives an
//! OAuth2 authorization-code flow, protects it with single-use CSRF tokens,
//! converts a short-lived anonymous visit into a secure authenticated
//! session, and persists session state behind encrypted, tamper-evident
//! cookies. It is consumed by a host HTTP layer but owns no transport code
//! itself.
//!
//! ## Architecture
//!
//! ```text
//! start    → CSRF issue → authorization redirect
//! complete → CSRF verify → token exchange → JWT verify + claims
//!          → anonymous session persisted
//! later    → upgrade (anonymous → secure, same session ID)
//!          → authenticate / require-auth
//! ```
//!
//! Stores and external collaborators (CSRF tokens, session documents, user
//! lookup, JWT verification, token exchange) are injected behind traits;
//! in-memory and Redis implementations ship in [`stores`], mocks in
//! [`mocks`].
//!
//! ## Example: composing the engine
//!
//! ```rust,ignore
//! use aegis_auth::*;
//!
//! let crypto = CookieCrypto::new(&CookieKey::from_hex(&key_hex)?);
//! let lifecycle = SessionLifecycle::new(sessions.clone(), users);
//! let oauth = OAuth2Orchestrator::new(config.clone(), csrf,
//!     HttpTokenExchanger::new(config), verifier, lifecycle.clone());
//!
//! // per request:
//! let mut jar = SessionCookies::from_request(crypto.clone(), cookies)?;
//! let redirect = oauth.start(&mut jar).await?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod constants;
pub mod cookies;
pub mod crypto;
pub mod error;
pub mod jwt;
pub mod oauth2;
pub mod providers;
pub mod session;
pub mod state;
pub mod stores;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use config::OAuth2Config;
pub use cookies::{RequestCookies, SameSite, SessionCookies, SetCookie};
pub use crypto::{CookieCrypto, CookieKey, CookieNonce, CookieValue};
pub use error::{AuthError, RejectionReason, Result};
pub use jwt::{JwtClaims, validate_claims};
pub use oauth2::{AuthorizationRedirect, CallbackParams, CompleteOutcome, OAuth2Orchestrator};
pub use session::{RequireAuth, SessionLifecycle};
pub use state::{AuthenticatedUser, SessionDocument, SessionId, SessionKind, UserId, UserRecord};
