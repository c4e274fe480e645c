//! Mock JWT verifier for testing.

use crate::error::{AuthError, Result};
use crate::jwt::JwtClaims;
use crate::providers::JwtVerifier;
use std::sync::{Arc, Mutex};

/// Mock JWT verifier.
///
/// Returns configured claims for any token, or a signature error by
/// default. Records every verified token.
#[derive(Debug, Clone)]
pub struct MockJwtVerifier {
    claims: Arc<Mutex<Option<JwtClaims>>>,
    tokens: Arc<Mutex<Vec<String>>>,
}

impl MockJwtVerifier {
    /// Create a verifier that rejects every token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            claims: Arc::new(Mutex::new(None)),
            tokens: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Accept every token, yielding the given claims.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn with_claims(self, claims: JwtClaims) -> Self {
        *self.claims.lock().unwrap() = Some(claims);
        self
    }

    /// Tokens verified so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn verified_tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

impl Default for MockJwtVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl JwtVerifier for MockJwtVerifier {
    async fn verify_signature(&self, token: &str) -> Result<JwtClaims> {
        self.tokens
            .lock()
            .map_err(|_| AuthError::Internal("mock verifier mutex poisoned".to_string()))?
            .push(token.to_string());

        self.claims
            .lock()
            .map_err(|_| AuthError::Internal("mock verifier mutex poisoned".to_string()))?
            .clone()
            .ok_or_else(|| AuthError::SignatureInvalid("mock verifier rejects".to_string()))
    }
}
