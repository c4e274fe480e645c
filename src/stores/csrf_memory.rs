//! In-memory CSRF token store.

use crate::error::{AuthError, Result};
use crate::providers::csrf::{CsrfTokenStore, new_csrf_token};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// In-memory CSRF token store.
///
/// A mutex-guarded set of outstanding tokens. Verification is a single
/// atomic remove, so concurrent verifications of the same token admit
/// exactly one winner. Suited to single-process deployments; orphaned
/// tokens (issued but never verified) persist for the process lifetime.
///
/// # Thread Safety
///
/// `Clone` shares the underlying set; no lock is held across an await.
#[derive(Debug, Clone)]
pub struct InMemoryCsrfTokenStore {
    tokens: Arc<Mutex<HashSet<String>>>,
}

impl InMemoryCsrfTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashSet<String>>> {
        self.tokens
            .lock()
            .map_err(|_| AuthError::Internal("csrf token store mutex poisoned".to_string()))
    }

    /// Number of outstanding tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the store mutex is poisoned.
    pub fn outstanding(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}

impl Default for InMemoryCsrfTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CsrfTokenStore for InMemoryCsrfTokenStore {
    async fn issue(&self) -> Result<String> {
        let token = new_csrf_token();
        self.lock()?.insert(token.clone());
        Ok(token)
    }

    async fn verify(&self, token: &str) -> Result<bool> {
        // Single compare-and-remove; present tokens are consumed, absent
        // tokens are reported without touching the set.
        Ok(self.lock()?.remove(token))
    }

    async fn reset(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issued_token_verifies_once() {
        let store = InMemoryCsrfTokenStore::new();

        let token = store.issue().await.unwrap();
        assert!(store.verify(&token).await.unwrap());
        assert!(!store.verify(&token).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_token_fails() {
        let store = InMemoryCsrfTokenStore::new();
        assert!(!store.verify("never-issued").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_verify_orphans_other_tokens() {
        let store = InMemoryCsrfTokenStore::new();
        let token = store.issue().await.unwrap();

        assert!(!store.verify("wrong").await.unwrap());
        // The outstanding token is untouched by the failed attempt.
        assert!(store.verify(&token).await.unwrap());
    }

    #[tokio::test]
    async fn test_reset_clears_outstanding_tokens() {
        let store = InMemoryCsrfTokenStore::new();
        let token = store.issue().await.unwrap();
        assert_eq!(store.outstanding().unwrap(), 1);

        store.reset().await.unwrap();
        assert_eq!(store.outstanding().unwrap(), 0);
        assert!(!store.verify(&token).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_verify_admits_one_winner() {
        let store = InMemoryCsrfTokenStore::new();
        let token = store.issue().await.unwrap();

        let store1 = store.clone();
        let store2 = store.clone();
        let (r1, r2) = tokio::join!(store1.verify(&token), store2.verify(&token));

        let successes = [r1.unwrap(), r2.unwrap()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1, "exactly one concurrent verify should win");
    }
}
