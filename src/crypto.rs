//! Authenticated cookie encryption.
//!
//! Cookie payloads are encrypted with XChaCha20-Poly1305 (32-byte key,
//! 24-byte nonce, 16-byte tag) under a symmetric key configured once at
//! startup. A fresh nonce is generated per encryption call; decryption fails
//! closed on any tampering of key, nonce, or ciphertext.
//!
//! Payloads are carried as JSON, so a string round-trips as a string and a
//! structured value as a structured value.

use crate::error::{AuthError, Result};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Key length in bytes (XChaCha20-Poly1305).
pub const KEY_LENGTH: usize = 32;

/// Nonce length in bytes (XChaCha20-Poly1305).
pub const NONCE_LENGTH: usize = 24;

/// Symmetric cookie-encryption key.
#[derive(Clone)]
pub struct CookieKey([u8; KEY_LENGTH]);

impl CookieKey {
    /// Generate a new random key.
    #[must_use]
    pub fn generate() -> Self {
        Self(rand::random())
    }

    /// Build a key from exactly [`KEY_LENGTH`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidKeyLength`] for any other length. Wrong
    /// key size is a fatal configuration error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let key: [u8; KEY_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| AuthError::InvalidKeyLength {
                    expected: KEY_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(key))
    }

    /// Build a key from hex-encoded key material.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidKeyMaterial`] for malformed hex and
    /// [`AuthError::InvalidKeyLength`] for the wrong decoded length.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes =
            hex::decode(s).map_err(|e| AuthError::InvalidKeyMaterial(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }
}

impl std::fmt::Debug for CookieKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material never appears in logs.
        f.write_str("CookieKey(..)")
    }
}

/// Per-encryption nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieNonce([u8; NONCE_LENGTH]);

impl CookieNonce {
    /// Generate a fresh random nonce.
    #[must_use]
    pub fn generate() -> Self {
        Self(rand::random())
    }

    /// Build a nonce from exactly [`NONCE_LENGTH`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidNonceLength`] for any other length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let nonce: [u8; NONCE_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| AuthError::InvalidNonceLength {
                    expected: NONCE_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(nonce))
    }

    /// Build a nonce from its hex-encoded form.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidKeyMaterial`] for malformed hex and
    /// [`AuthError::InvalidNonceLength`] for the wrong decoded length.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes =
            hex::decode(s).map_err(|e| AuthError::InvalidKeyMaterial(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Hex-encoded nonce, as written to the nonce cookie.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw nonce bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; NONCE_LENGTH] {
        &self.0
    }
}

/// Cleartext cookie payload.
///
/// Records which representation was used so decryption returns the same
/// shape: a string decrypts back to `Text`, a structured value to `Json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CookieValue {
    /// Plain string payload.
    Text(String),

    /// JSON-structured payload.
    Json(serde_json::Value),
}

impl CookieValue {
    /// The payload as a string, if it is the `Text` representation.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Json(_) => None,
        }
    }
}

/// Authenticated cookie cipher.
///
/// Wraps an XChaCha20-Poly1305 cipher behind an `Arc` so one configured key
/// can be shared across request tasks. Each encryption call takes a fresh
/// nonce; nonce reuse across clones is not a concern.
#[derive(Clone)]
pub struct CookieCrypto {
    cipher: Arc<XChaCha20Poly1305>,
}

impl CookieCrypto {
    /// Create a cipher from the configured key.
    #[must_use]
    pub fn new(key: &CookieKey) -> Self {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
        Self {
            cipher: Arc::new(cipher),
        }
    }

    /// Encrypt a cookie payload under the given nonce.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Serialization`] if the payload cannot be encoded
    /// and [`AuthError::EncryptionFailed`] if the cipher fails.
    pub fn encrypt(&self, value: &CookieValue, nonce: &CookieNonce) -> Result<Vec<u8>> {
        let plaintext =
            serde_json::to_vec(value).map_err(|e| AuthError::Serialization(e.to_string()))?;

        self.cipher
            .encrypt(XNonce::from_slice(nonce.as_bytes()), plaintext.as_ref())
            .map_err(|_| AuthError::EncryptionFailed)
    }

    /// Decrypt a cookie payload under the given nonce.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DecryptionFailed`] if the key, nonce, or
    /// ciphertext has been tampered with. Never returns partial data.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &CookieNonce) -> Result<CookieValue> {
        let plaintext = self
            .cipher
            .decrypt(XNonce::from_slice(nonce.as_bytes()), ciphertext)
            .map_err(|_| AuthError::DecryptionFailed)?;

        // An authenticated payload that is not valid JSON is still tampering.
        serde_json::from_slice(&plaintext).map_err(|_| AuthError::DecryptionFailed)
    }
}

impl std::fmt::Debug for CookieCrypto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CookieCrypto(..)")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_key_and_nonce_lengths() {
        assert!(CookieKey::from_bytes(&[0u8; 16]).is_err());
        assert!(CookieKey::from_bytes(&[0u8; 32]).is_ok());
        assert!(CookieNonce::from_bytes(&[0u8; 12]).is_err());
        assert!(CookieNonce::from_bytes(&[0u8; 24]).is_ok());
    }

    #[test]
    fn test_key_from_hex() {
        let key = CookieKey::generate();
        let round_tripped = CookieKey::from_hex(&hex::encode(key.as_bytes())).unwrap();
        assert_eq!(key.as_bytes(), round_tripped.as_bytes());

        assert!(matches!(
            CookieKey::from_hex("not hex"),
            Err(AuthError::InvalidKeyMaterial(_))
        ));
        assert!(matches!(
            CookieKey::from_hex("abcd"),
            Err(AuthError::InvalidKeyLength { expected: 32, actual: 2 })
        ));
    }

    #[test]
    fn test_nonce_hex_round_trip() {
        let nonce = CookieNonce::generate();
        assert_eq!(CookieNonce::from_hex(&nonce.to_hex()).unwrap(), nonce);
    }

    #[test]
    fn test_string_round_trip() {
        let crypto = CookieCrypto::new(&CookieKey::generate());
        let nonce = CookieNonce::generate();

        let ciphertext = crypto
            .encrypt(&CookieValue::Text("hello".to_string()), &nonce)
            .unwrap();
        let decrypted = crypto.decrypt(&ciphertext, &nonce).unwrap();

        assert_eq!(decrypted, CookieValue::Text("hello".to_string()));
    }

    #[test]
    fn test_structured_round_trip_preserves_shape() {
        let crypto = CookieCrypto::new(&CookieKey::generate());
        let nonce = CookieNonce::generate();
        let value = CookieValue::Json(serde_json::json!({"sid": "abc", "n": 7}));

        let ciphertext = crypto.encrypt(&value, &nonce).unwrap();
        assert_eq!(crypto.decrypt(&ciphertext, &nonce).unwrap(), value);
    }

    #[test]
    fn test_wrong_key_fails_closed() {
        let crypto = CookieCrypto::new(&CookieKey::generate());
        let other = CookieCrypto::new(&CookieKey::generate());
        let nonce = CookieNonce::generate();

        let ciphertext = crypto
            .encrypt(&CookieValue::Text("hello".to_string()), &nonce)
            .unwrap();

        assert_eq!(
            other.decrypt(&ciphertext, &nonce).unwrap_err(),
            AuthError::DecryptionFailed
        );
    }

    #[test]
    fn test_flipped_nonce_fails_closed() {
        let crypto = CookieCrypto::new(&CookieKey::generate());
        let nonce = CookieNonce::generate();

        let ciphertext = crypto
            .encrypt(&CookieValue::Text("hello".to_string()), &nonce)
            .unwrap();

        let mut flipped = *nonce.as_bytes();
        flipped[0] ^= 0x01;
        let flipped = CookieNonce::from_bytes(&flipped).unwrap();

        assert_eq!(
            crypto.decrypt(&ciphertext, &flipped).unwrap_err(),
            AuthError::DecryptionFailed
        );
    }

    #[test]
    fn test_tampered_ciphertext_fails_closed() {
        let crypto = CookieCrypto::new(&CookieKey::generate());
        let nonce = CookieNonce::generate();

        let mut ciphertext = crypto
            .encrypt(&CookieValue::Text("hello".to_string()), &nonce)
            .unwrap();
        ciphertext[0] ^= 0x01;

        assert_eq!(
            crypto.decrypt(&ciphertext, &nonce).unwrap_err(),
            AuthError::DecryptionFailed
        );
    }
}
