//! JWT signature verification.
//!
//! Signature checking delegates to the standard `jsonwebtoken` primitive.
//! Claim-level validation is deliberately disabled here; the ordered checks
//! in [`crate::jwt::validate_claims`] run afterwards so every failure mode
//! stays independently reportable.

use crate::error::{AuthError, Result};
use crate::jwt::JwtClaims;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use std::collections::HashSet;
use std::sync::Arc;

/// JWT verifier.
///
/// Verifies an ID token's signature and returns its decoded claims.
/// Asynchronous with respect to the caller; signature failures are
/// [`AuthError::SignatureInvalid`] (source tag `error-source.jwt-signature`).
pub trait JwtVerifier: Send + Sync {
    /// Verify the token's signature and decode its claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SignatureInvalid`] if the cryptographic check
    /// fails or the token is malformed.
    fn verify_signature(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<JwtClaims>> + Send;
}

/// Verifier over a fixed decoding key.
///
/// Production hosts construct this once at startup from the provider's
/// public key (RSA PEM) or, for HMAC-signed tokens, a shared secret.
#[derive(Clone)]
pub struct StaticKeyVerifier {
    decoding_key: Arc<DecodingKey>,
    algorithm: Algorithm,
}

impl StaticKeyVerifier {
    /// Build an RS256 verifier from an RSA public key in PEM form.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidKeyMaterial`] if the PEM cannot be
    /// parsed.
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(pem)
            .map_err(|e| AuthError::InvalidKeyMaterial(e.to_string()))?;
        Ok(Self {
            decoding_key: Arc::new(decoding_key),
            algorithm: Algorithm::RS256,
        })
    }

    /// Build an HS256 verifier from a shared secret.
    #[must_use]
    pub fn from_hmac_secret(secret: &[u8]) -> Self {
        Self {
            decoding_key: Arc::new(DecodingKey::from_secret(secret)),
            algorithm: Algorithm::HS256,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        // Signature check only. Expiry, issuer, and audience run through the
        // ordered claims checks afterwards.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();
        validation
    }
}

impl std::fmt::Debug for StaticKeyVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticKeyVerifier")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl JwtVerifier for StaticKeyVerifier {
    async fn verify_signature(&self, token: &str) -> Result<JwtClaims> {
        jsonwebtoken::decode::<JwtClaims>(token, &self.decoding_key, &self.validation())
            .map(|data| data.claims)
            .map_err(|e| AuthError::SignatureInvalid(e.to_string()))
    }
}
