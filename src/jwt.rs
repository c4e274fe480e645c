//! ID-token claims and claims validation.
//!
//! Signature verification lives behind the [`crate::providers::JwtVerifier`]
//! trait; this module holds the claims struct and the ordered claims checks.
//! The claim checks run in a fixed order and the first failure is the one
//! reported, with no aggregation.

use crate::error::{AuthError, Result};
use serde::{Deserialize, Serialize};

/// Decoded ID-token claims.
///
/// Immutable once parsed from a verified token. Numeric dates are seconds
/// since epoch. Field presence is kept bincode-friendly: optional claims are
/// plain `Option`s, never skipped during serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Issuer.
    pub iss: String,

    /// Audience.
    pub aud: String,

    /// Expiry, seconds since epoch.
    pub exp: i64,

    /// Issued-at, seconds since epoch.
    #[serde(default)]
    pub iat: i64,

    /// Subject: the provider's stable user identifier (e.g., `"p|1"`).
    pub sub: String,

    /// Email address, if the `email` scope was granted.
    #[serde(default)]
    pub email: Option<String>,

    /// Whether the provider has verified the email address.
    #[serde(default)]
    pub email_verified: Option<bool>,
}

/// Validate standard claims against the expected domain and client ID.
///
/// Checks run in a fixed order; the first failing check is the one reported:
///
/// 1. expiry (`now > exp` → [`AuthError::TokenExpired`])
/// 2. issuer (`iss != "https://{expected_domain}/"` → [`AuthError::InvalidIssuer`])
/// 3. audience (`aud != expected_client_id` → [`AuthError::InvalidAudience`])
///
/// # Errors
///
/// Returns the first failing claims check, all tagged
/// `error-source.jwt-claims`.
pub fn validate_claims(
    claims: &JwtClaims,
    expected_domain: &str,
    expected_client_id: &str,
) -> Result<()> {
    validate_claims_at(
        claims,
        expected_domain,
        expected_client_id,
        chrono::Utc::now().timestamp(),
    )
}

/// [`validate_claims`] with an explicit `now`, seconds since epoch.
///
/// # Errors
///
/// Returns the first failing claims check.
pub fn validate_claims_at(
    claims: &JwtClaims,
    expected_domain: &str,
    expected_client_id: &str,
    now: i64,
) -> Result<()> {
    if now > claims.exp {
        return Err(AuthError::TokenExpired {
            now,
            exp: claims.exp,
        });
    }

    let expected_issuer = format!("https://{expected_domain}/");
    if claims.iss != expected_issuer {
        return Err(AuthError::InvalidIssuer {
            issuer: claims.iss.clone(),
        });
    }

    if claims.aud != expected_client_id {
        return Err(AuthError::InvalidAudience {
            audience: claims.aud.clone(),
        });
    }

    Ok(())
}
