//! Transport-independent cookie handling.
//!
//! The engine owns no HTTP code: the host hands in already-parsed request
//! cookies (or a raw `Cookie` header via [`RequestCookies::parse`]) and
//! receives [`SetCookie`] instructions back, each rendering a `Set-Cookie`
//! header value.
//!
//! [`SessionCookies`] is the per-request jar tying the cookie pairs to the
//! configured cipher: every session cookie write emits two cookies (the
//! hex-encoded ciphertext and the hex-encoded nonce), and every read requires
//! both.

use crate::constants::cookies as names;
use crate::crypto::{CookieCrypto, CookieNonce, CookieValue};
use crate::error::{AuthError, Result};
use crate::state::{SessionId, SessionKind};
use std::collections::HashMap;

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// `SameSite=Strict`.
    Strict,
    /// `SameSite=Lax`.
    Lax,
    /// `SameSite=None`.
    None,
}

impl SameSite {
    /// Attribute value as written to the header.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

/// A pending cookie set or clear instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    /// Cookie name.
    pub name: String,

    /// Cookie value. Empty for clearing instructions.
    pub value: String,

    /// `Max-Age` in seconds. Zero clears the cookie.
    pub max_age: i64,

    /// `Path` attribute.
    pub path: String,

    /// `HttpOnly` attribute.
    pub http_only: bool,

    /// `Secure` attribute.
    pub secure: bool,

    /// `SameSite` attribute, if set.
    pub same_site: Option<SameSite>,
}

impl SetCookie {
    /// A session cookie write: `HttpOnly`, `Secure`, `Path=/`, 90-day
    /// `Max-Age`.
    #[must_use]
    pub fn session(name: &str, value: String, same_site: Option<SameSite>) -> Self {
        Self {
            name: name.to_string(),
            value,
            max_age: names::MAX_AGE_SECONDS,
            path: "/".to_string(),
            http_only: true,
            secure: true,
            same_site,
        }
    }

    /// A clearing instruction: empty value, `Max-Age=0`.
    #[must_use]
    pub fn clearing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: String::new(),
            max_age: 0,
            path: "/".to_string(),
            http_only: true,
            secure: true,
            same_site: None,
        }
    }

    /// Returns `true` if this instruction clears the cookie.
    #[must_use]
    pub const fn is_clearing(&self) -> bool {
        self.max_age == 0
    }

    /// Render the `Set-Cookie` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        let mut parts = vec![
            format!("{}={}", self.name, self.value),
            format!("Max-Age={}", self.max_age),
            format!("Path={}", self.path),
        ];
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        if self.secure {
            parts.push("Secure".to_string());
        }
        if let Some(same_site) = self.same_site {
            parts.push(format!("SameSite={}", same_site.as_str()));
        }
        parts.join("; ")
    }
}

/// Parsed request cookies.
#[derive(Debug, Clone, Default)]
pub struct RequestCookies {
    pairs: HashMap<String, String>,
}

impl RequestCookies {
    /// Build from already-parsed key/value pairs.
    #[must_use]
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// Parse a raw `Cookie` header (`"a=1; b=2"`).
    ///
    /// Malformed segments are skipped.
    #[must_use]
    pub fn parse(header: &str) -> Self {
        let pairs = header
            .split(';')
            .filter_map(|segment| {
                let (name, value) = segment.trim().split_once('=')?;
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.to_string()))
            })
            .collect();
        Self { pairs }
    }

    /// Look up a cookie by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.get(name).map(String::as_str)
    }

    /// Returns `true` if the request carried no cookies at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Per-request session cookie jar.
///
/// Reads decrypt the session cookie pair from the request; writes accumulate
/// [`SetCookie`] instructions for the host to apply to the response.
#[derive(Debug)]
pub struct SessionCookies {
    crypto: CookieCrypto,
    request: RequestCookies,
    pending: Vec<SetCookie>,
}

impl SessionCookies {
    /// Build the jar from the request's cookies.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::IllegalSessionCookies`] if the request carries
    /// both an anonymous and a secure session cookie. That is corrupted or
    /// illegal client state and is rejected before any session logic runs.
    pub fn from_request(crypto: CookieCrypto, request: RequestCookies) -> Result<Self> {
        if request.get(names::ANONYMOUS_SESSION).is_some()
            && request.get(names::SECURE_SESSION).is_some()
        {
            tracing::warn!("request carries both session cookie kinds, rejecting");
            return Err(AuthError::IllegalSessionCookies);
        }

        Ok(Self {
            crypto,
            request,
            pending: Vec::new(),
        })
    }

    fn cookie_name(kind: SessionKind) -> &'static str {
        match kind {
            SessionKind::Anonymous => names::ANONYMOUS_SESSION,
            SessionKind::Secure => names::SECURE_SESSION,
        }
    }

    fn has_pair(&self, kind: SessionKind) -> bool {
        self.request.get(Self::cookie_name(kind)).is_some()
            && self.request.get(names::NONCE).is_some()
    }

    /// Returns `true` if the request carries the anonymous session cookie
    /// pair (payload and nonce).
    #[must_use]
    pub fn has_anonymous_session_cookie(&self) -> bool {
        self.has_pair(SessionKind::Anonymous)
    }

    /// Returns `true` if the request carries the secure session cookie pair.
    #[must_use]
    pub fn has_secure_session_cookie(&self) -> bool {
        self.has_pair(SessionKind::Secure)
    }

    /// Returns `true` if the request carries no session cookie of either
    /// kind.
    #[must_use]
    pub fn has_no_session_cookie(&self) -> bool {
        self.request.get(names::ANONYMOUS_SESSION).is_none()
            && self.request.get(names::SECURE_SESSION).is_none()
    }

    fn session_value(&self, kind: SessionKind) -> Result<CookieValue> {
        let payload = self
            .request
            .get(Self::cookie_name(kind))
            .ok_or(AuthError::SessionCookieMissing { kind })?;
        let nonce_hex = self
            .request
            .get(names::NONCE)
            .ok_or(AuthError::SessionCookieMissing { kind })?;

        // Client-supplied hex that fails to decode is tampering.
        let nonce = CookieNonce::from_hex(nonce_hex).map_err(|_| AuthError::DecryptionFailed)?;
        let ciphertext = hex::decode(payload).map_err(|_| AuthError::DecryptionFailed)?;

        self.crypto.decrypt(&ciphertext, &nonce)
    }

    /// Decrypt the anonymous session cookie's payload.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionCookieMissing`] if either cookie of the
    /// pair is absent, and [`AuthError::DecryptionFailed`] on tampering.
    pub fn anonymous_session_value(&self) -> Result<CookieValue> {
        self.session_value(SessionKind::Anonymous)
    }

    /// Decrypt the secure session cookie's payload.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionCookieMissing`] if either cookie of the
    /// pair is absent, and [`AuthError::DecryptionFailed`] on tampering.
    pub fn secure_session_value(&self) -> Result<CookieValue> {
        self.session_value(SessionKind::Secure)
    }

    fn session_id(&self, kind: SessionKind) -> Result<SessionId> {
        let value = self.session_value(kind)?;
        let text = value.as_text().ok_or_else(|| {
            AuthError::Serialization("session cookie did not carry a session id".to_string())
        })?;
        SessionId::parse(text)
    }

    /// The session ID carried by the anonymous cookie pair.
    ///
    /// # Errors
    ///
    /// Propagates the read-path errors of [`Self::anonymous_session_value`].
    pub fn anonymous_session_id(&self) -> Result<SessionId> {
        self.session_id(SessionKind::Anonymous)
    }

    /// The session ID carried by the secure cookie pair.
    ///
    /// # Errors
    ///
    /// Propagates the read-path errors of [`Self::secure_session_value`].
    pub fn secure_session_id(&self) -> Result<SessionId> {
        self.session_id(SessionKind::Secure)
    }

    fn set_session_cookie(
        &mut self,
        kind: SessionKind,
        session_id: SessionId,
        same_site: Option<SameSite>,
    ) -> Result<()> {
        let nonce = CookieNonce::generate();
        let ciphertext = self
            .crypto
            .encrypt(&CookieValue::Text(session_id.to_string()), &nonce)?;

        self.pending.push(SetCookie::session(
            Self::cookie_name(kind),
            hex::encode(ciphertext),
            same_site,
        ));
        self.pending
            .push(SetCookie::session(names::NONCE, nonce.to_hex(), same_site));
        Ok(())
    }

    /// Write the anonymous session cookie pair.
    ///
    /// Emits two instructions: the encrypted payload and its nonce, both
    /// `HttpOnly`, `Secure`, `Path=/`, 90-day `Max-Age`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EncryptionFailed`] if the payload cannot be
    /// encrypted.
    pub fn set_anonymous_session_cookie(&mut self, session_id: SessionId) -> Result<()> {
        self.set_session_cookie(SessionKind::Anonymous, session_id, None)
    }

    /// Write the secure session cookie pair.
    ///
    /// Like the anonymous variant, with `SameSite=Strict` on both cookies.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EncryptionFailed`] if the payload cannot be
    /// encrypted.
    pub fn set_secure_session_cookie(&mut self, session_id: SessionId) -> Result<()> {
        self.set_session_cookie(SessionKind::Secure, session_id, Some(SameSite::Strict))
    }

    fn remove_session_cookie(&mut self, kind: SessionKind) -> Result<()> {
        if !self.has_pair(kind) {
            return Err(AuthError::SessionCookieMissing { kind });
        }
        self.pending.push(SetCookie::clearing(Self::cookie_name(kind)));
        self.pending.push(SetCookie::clearing(names::NONCE));
        Ok(())
    }

    /// Clear the anonymous session cookie pair (`Max-Age=0` on both).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionCookieMissing`] if the request did not
    /// carry the pair.
    pub fn remove_anonymous_session_cookie(&mut self) -> Result<()> {
        self.remove_session_cookie(SessionKind::Anonymous)
    }

    /// Clear the secure session cookie pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionCookieMissing`] if the request did not
    /// carry the pair.
    pub fn remove_secure_session_cookie(&mut self) -> Result<()> {
        self.remove_session_cookie(SessionKind::Secure)
    }

    /// Pending set/clear instructions accumulated so far.
    ///
    /// A later instruction for the same cookie name supersedes an earlier
    /// one, which is how the upgrade path swaps the nonce cookie in a single
    /// response.
    #[must_use]
    pub fn pending(&self) -> &[SetCookie] {
        &self.pending
    }

    /// Take the pending instructions, leaving the jar empty.
    pub fn take_pending(&mut self) -> Vec<SetCookie> {
        std::mem::take(&mut self.pending)
    }
}
