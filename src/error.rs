//! Error types for the authentication engine.

use crate::state::SessionKind;
use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Comprehensive error taxonomy for the authentication engine.
///
/// Variants are organized by category: configuration errors are fatal
/// integration bugs, protocol errors are recovered per-request by the host,
/// cryptographic errors always fail closed, upstream errors are caught by the
/// orchestrator (the single fail-open point), and JWT errors carry a source
/// tag distinguishing signature failures from claims failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════

    /// Symmetric key has the wrong length.
    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required key length in bytes.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// Nonce has the wrong length.
    #[error("Invalid nonce length: expected {expected} bytes, got {actual}")]
    InvalidNonceLength {
        /// Required nonce length in bytes.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// Key or nonce material could not be decoded.
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    // ═══════════════════════════════════════════════════════════
    // Protocol Errors
    // ═══════════════════════════════════════════════════════════

    /// The request does not carry the session cookie pair.
    ///
    /// Both the payload cookie and the nonce cookie must be present;
    /// absence of either is reported as "no session" for the given kind.
    #[error("No {kind} session on the request")]
    SessionCookieMissing {
        /// Which session cookie pair was expected.
        kind: SessionKind,
    },

    /// The request carries both an anonymous and a secure session cookie.
    ///
    /// This is corrupted or illegal client state and is rejected before any
    /// session logic runs.
    #[error("Request carries both anonymous and secure session cookies")]
    IllegalSessionCookies,

    /// A session lifecycle transition was rejected.
    #[error("Session rejected: {0}")]
    SessionRejected(RejectionReason),

    // ═══════════════════════════════════════════════════════════
    // Cryptographic Errors
    // ═══════════════════════════════════════════════════════════

    /// Cookie payload encryption failed.
    #[error("Cookie encryption failed")]
    EncryptionFailed,

    /// Cookie payload decryption failed.
    ///
    /// Covers a tampered ciphertext, a tampered or malformed nonce, and a
    /// wrong key. Always fails closed; no partial data is returned.
    #[error("Cookie decryption failed")]
    DecryptionFailed,

    // ═══════════════════════════════════════════════════════════
    // Upstream Errors
    // ═══════════════════════════════════════════════════════════

    /// The provider token endpoint returned a non-OK response.
    #[error("Token exchange failed with status {status}")]
    TokenExchangeFailed {
        /// HTTP status returned by the token endpoint.
        status: u16,
        /// Response body, for operator logs.
        detail: String,
    },

    /// The token exchange request could not be sent.
    #[error("Transport error: {0}")]
    Transport(String),

    // ═══════════════════════════════════════════════════════════
    // JWT Errors
    // ═══════════════════════════════════════════════════════════

    /// ID-token signature verification failed.
    #[error("JWT signature verification failed: {0}")]
    SignatureInvalid(String),

    /// ID token has expired.
    #[error("Token expired at {exp} (now {now})")]
    TokenExpired {
        /// Current time, seconds since epoch.
        now: i64,
        /// `exp` claim, seconds since epoch.
        exp: i64,
    },

    /// ID-token issuer does not match the expected domain.
    #[error("Invalid issuer: {issuer}")]
    InvalidIssuer {
        /// Issuer claim that was presented.
        issuer: String,
    },

    /// ID-token audience does not match the expected client ID.
    #[error("Invalid audience: {audience}")]
    InvalidAudience {
        /// Audience claim that was presented.
        audience: String,
    },

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Store operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Encoding or decoding of a stored value failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns `true` if this error is a fatal configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// # use aegis_auth::AuthError;
    /// assert!(AuthError::InvalidKeyLength { expected: 32, actual: 16 }.is_configuration_error());
    /// assert!(!AuthError::DecryptionFailed.is_configuration_error());
    /// ```
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidKeyLength { .. }
                | Self::InvalidNonceLength { .. }
                | Self::InvalidKeyMaterial(_)
        )
    }

    /// Returns `true` if this error is a per-request protocol error.
    ///
    /// Protocol errors are recovered locally by redirecting or rejecting the
    /// request; they never crash the process.
    pub const fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::SessionCookieMissing { .. }
                | Self::IllegalSessionCookies
                | Self::SessionRejected(_)
        )
    }

    /// Returns `true` if this error came from JWT signature verification.
    ///
    /// # Examples
    ///
    /// ```
    /// # use aegis_auth::AuthError;
    /// assert!(AuthError::SignatureInvalid("bad".to_string()).is_signature_error());
    /// assert!(!AuthError::TokenExpired { now: 10, exp: 5 }.is_signature_error());
    /// ```
    pub const fn is_signature_error(&self) -> bool {
        matches!(self, Self::SignatureInvalid(_))
    }

    /// Returns `true` if this error came from JWT claims validation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use aegis_auth::AuthError;
    /// assert!(AuthError::TokenExpired { now: 10, exp: 5 }.is_claims_error());
    /// assert!(!AuthError::SignatureInvalid("bad".to_string()).is_claims_error());
    /// ```
    pub const fn is_claims_error(&self) -> bool {
        matches!(
            self,
            Self::TokenExpired { .. } | Self::InvalidIssuer { .. } | Self::InvalidAudience { .. }
        )
    }

    /// Returns `true` if this error came from the external token endpoint.
    pub const fn is_upstream_error(&self) -> bool {
        matches!(self, Self::TokenExchangeFailed { .. } | Self::Transport(_))
    }

    /// Stable source tag for log correlation, if this error class carries one.
    ///
    /// JWT failures are tagged `error-source.jwt-signature` or
    /// `error-source.jwt-claims`; session rejections carry the tag of their
    /// [`RejectionReason`].
    pub const fn source_tag(&self) -> Option<&'static str> {
        match self {
            Self::SignatureInvalid(_) => Some("error-source.jwt-signature"),
            Self::TokenExpired { .. } | Self::InvalidIssuer { .. } | Self::InvalidAudience { .. } => {
                Some("error-source.jwt-claims")
            }
            Self::SessionRejected(reason) => Some(reason.as_str()),
            _ => None,
        }
    }
}

/// Enumerated reasons for rejecting a session lifecycle transition.
///
/// Each reason is distinguishable so hosts can customize messaging without
/// changing the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// The anonymous cookie's session document is missing, unusable, or
    /// already upgraded (stale-cookie replay).
    AnonymousSessionInvalid,

    /// No anonymous session cookie pair on the request.
    AnonymousSessionMissing,

    /// The secure cookie's session document is missing or not secure.
    SecureSessionInvalid,

    /// No secure session cookie pair on the request.
    SecureSessionMissing,

    /// The request carries no session cookie of either kind.
    MissingSession,
}

impl RejectionReason {
    /// Stable dotted source tag for this rejection reason.
    ///
    /// # Examples
    ///
    /// ```
    /// # use aegis_auth::error::RejectionReason;
    /// assert_eq!(
    ///     RejectionReason::AnonymousSessionInvalid.as_str(),
    ///     "error-source.anonymous-session.invalid-session",
    /// );
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AnonymousSessionInvalid => "error-source.anonymous-session.invalid-session",
            Self::AnonymousSessionMissing => "error-source.anonymous-session.missing-session",
            Self::SecureSessionInvalid => "error-source.secure-session.invalid-session",
            Self::SecureSessionMissing => "error-source.secure-session.missing-session",
            Self::MissingSession => "error-source.no-session",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
