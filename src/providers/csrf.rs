//! CSRF token store trait.
//!
//! Single-use anti-forgery tokens binding an authorization request to its
//! callback.

use crate::error::Result;
use base64::Engine;

/// Generate a fresh CSRF token: 32 cryptographically random bytes,
/// base64-encoded (44 characters).
#[must_use]
pub fn new_csrf_token() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// CSRF token store.
///
/// This trait abstracts over outstanding-token storage with atomic
/// single-use semantics.
///
/// # Security Requirements
///
/// 1. **Atomicity**: `verify` must atomically check and remove (a
///    mutex-guarded set remove, or `Redis` GETDEL)
/// 2. **Single-use**: Once verified, a token cannot be verified again
/// 3. **Entropy**: Issued tokens carry 256 bits of randomness
///
/// Tokens that fail verification are never removed: an orphaned token stays
/// outstanding until the store's own expiry policy (if any) drops it. This
/// is an accepted tradeoff, not a leak to fix at the call site.
pub trait CsrfTokenStore: Send + Sync {
    /// Issue a new token and record it as outstanding.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage operation fails.
    fn issue(&self) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Verify a token, atomically removing it on success.
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: the token was outstanding and has been consumed
    /// - `Ok(false)`: the token is absent (forged, already used, or never
    ///   issued); the caller decides how to react
    ///
    /// Double-verification of the same token always returns `false` on the
    /// second attempt.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage operation fails; a mismatch is
    /// `Ok(false)`, not an error.
    fn verify(&self, token: &str) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Clear all outstanding tokens.
    ///
    /// Administrative/test operation only; never expose to untrusted
    /// callers.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage operation fails.
    fn reset(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = new_csrf_token();
        // 32 bytes base64-encode to 44 characters, well above the 12-char
        // entropy floor.
        assert_eq!(token.len(), 44);
        assert!(token.len() >= 12);
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(new_csrf_token(), new_csrf_token());
    }
}
