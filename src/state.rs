//! Session state types.
//!
//! The session document is a sum type so "exactly one variant per session ID"
//! is enforced by construction. All types are `Clone` and serde-serializable
//! so stores may persist them as JSON or bincode.

use crate::jwt::JwtClaims;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    /// Generate a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a session.
///
/// Serialized in cookies and store keys as the hyphenated UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    /// Generate a new random `SessionId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parse a session ID from its hyphenated string form.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::Serialization`] if the string is not a
    /// valid UUID.
    pub fn parse(s: &str) -> crate::error::Result<Self> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| crate::error::AuthError::Serialization(format!("invalid session id: {e}")))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Session Documents
// ═══════════════════════════════════════════════════════════════════════

/// Which of the two session kinds a cookie or document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    /// Pre-authentication session, pending identity resolution.
    Anonymous,
    /// Post-authentication session bound to a resolved local user.
    Secure,
}

impl SessionKind {
    /// Session kind as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Secure => "secure",
        }
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session document stored per session ID.
///
/// Exactly one variant exists per session ID at any time. Upgrading replaces
/// the `Anonymous` document with a `Secure` one under the same ID, so
/// in-flight cookies stay valid; only the cookie name changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionDocument {
    /// Pre-authentication document, holding the external identity token
    /// pending upgrade. `None` for plain first-visit sessions, which can
    /// never upgrade.
    Anonymous {
        /// Validated external identity claims, if the OAuth2 flow completed.
        id_token: Option<JwtClaims>,
    },

    /// Post-authentication document holding resolved local-user identity.
    Secure {
        /// User's email address.
        email: String,
        /// Resolved local user ID.
        user_id: UserId,
        /// Provider identifiers linked to this user.
        providers: Vec<String>,
    },
}

impl SessionDocument {
    /// Returns `true` for the `Anonymous` variant.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous { .. })
    }

    /// Returns `true` for the `Secure` variant.
    #[must_use]
    pub const fn is_secure(&self) -> bool {
        matches!(self, Self::Secure { .. })
    }

    /// The document's session kind.
    #[must_use]
    pub const fn kind(&self) -> SessionKind {
        match self {
            Self::Anonymous { .. } => SessionKind::Anonymous,
            Self::Secure { .. } => SessionKind::Secure,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// User Identity
// ═══════════════════════════════════════════════════════════════════════

/// Local user record resolved by the user directory collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Local user ID.
    pub id: UserId,

    /// User's email address.
    pub email: String,

    /// Provider identifiers linked to this user (e.g., `"google-oauth2|123"`).
    pub providers: Vec<String>,
}

/// Identity attached to a request after a successful authentication check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// The secure session's ID.
    pub session_id: SessionId,

    /// Resolved local user ID.
    pub user_id: UserId,

    /// User's email address.
    pub email: String,

    /// Provider identifiers linked to this user.
    pub providers: Vec<String>,
}
