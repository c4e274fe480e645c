//! Protocol constants.
//!
//! Cookie names and OAuth2 wire-format values are fixed protocol constants
//! shared between the engine and its host.

/// Fixed cookie names and attributes.
pub mod cookies {
    /// Anonymous session cookie. Carries the encrypted opaque session ID.
    pub const ANONYMOUS_SESSION: &str = "anon.sid";

    /// Secure session cookie. Carries the encrypted opaque session ID of an
    /// authenticated session.
    pub const SECURE_SESSION: &str = "aegis.sid";

    /// Nonce cookie. Carries the hex-encoded nonce that decrypts whichever
    /// session cookie was written alongside it.
    pub const NONCE: &str = "nonce.sid";

    /// Session cookie lifetime: 90 days, in seconds.
    pub const MAX_AGE_SECONDS: i64 = 90 * 24 * 60 * 60;
}

/// OAuth2 authorization-code flow constants.
pub mod oauth {
    /// `response_type` query parameter on the authorization redirect.
    pub const RESPONSE_TYPE: &str = "code";

    /// `scope` query parameter on the authorization redirect.
    pub const SCOPE: &str = "openid email";

    /// `grant_type` form field on the token-exchange request.
    pub const GRANT_TYPE: &str = "authorization_code";
}
