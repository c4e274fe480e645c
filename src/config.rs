//! OAuth2 configuration.
//!
//! Configuration is a plain struct built once at startup and passed by
//! reference into the orchestrator; re-configuration is unrepresentable.
//! Provider endpoint URLs are derived from the configured domain.

/// OAuth2 authorization-code flow configuration.
///
/// # Example
///
/// ```
/// use aegis_auth::config::OAuth2Config;
///
/// let config = OAuth2Config::new(
///     "auth.example.com".to_string(),
///     "client-id".to_string(),
///     "client-secret".to_string(),
///     "https://app.example.com/auth/callback".to_string(),
/// );
///
/// assert_eq!(config.authorize_url(), "https://auth.example.com/authorize");
/// assert_eq!(config.issuer(), "https://auth.example.com/");
/// ```
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    /// Provider domain (e.g., "auth.example.com"). Endpoint URLs and the
    /// expected issuer are derived from it.
    pub domain: String,

    /// OAuth2 client ID. Also the expected `aud` claim of ID tokens.
    pub client_id: String,

    /// OAuth2 client secret (keep confidential).
    pub client_secret: String,

    /// Callback URL registered with the provider; sent as `redirect_uri`.
    pub callback_url: String,

    /// Audience override for the authorization redirect.
    ///
    /// Default: the provider's userinfo URL.
    audience: Option<String>,
}

impl OAuth2Config {
    /// Create a new OAuth2 configuration.
    ///
    /// # Arguments
    ///
    /// * `domain` - Provider domain (e.g., "auth.example.com")
    /// * `client_id` - OAuth2 client ID
    /// * `client_secret` - OAuth2 client secret
    /// * `callback_url` - Registered redirect URI for the callback
    #[must_use]
    pub const fn new(
        domain: String,
        client_id: String,
        client_secret: String,
        callback_url: String,
    ) -> Self {
        Self {
            domain,
            client_id,
            client_secret,
            callback_url,
            audience: None,
        }
    }

    /// Override the `audience` sent on the authorization redirect.
    ///
    /// Default: the userinfo URL.
    #[must_use]
    pub fn with_audience(mut self, audience: String) -> Self {
        self.audience = Some(audience);
        self
    }

    /// Authorization endpoint: `https://{domain}/authorize`.
    #[must_use]
    pub fn authorize_url(&self) -> String {
        format!("https://{}/authorize", self.domain)
    }

    /// Token endpoint: `https://{domain}/oauth/token`.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("https://{}/oauth/token", self.domain)
    }

    /// Userinfo endpoint: `https://{domain}/userinfo`.
    #[must_use]
    pub fn user_info_url(&self) -> String {
        format!("https://{}/userinfo", self.domain)
    }

    /// API endpoint: `https://{domain}/api`.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("https://{}/api", self.domain)
    }

    /// Expected ID-token issuer: `https://{domain}/`.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    /// Audience for the authorization redirect.
    ///
    /// The configured override, or the userinfo URL by default.
    #[must_use]
    pub fn audience(&self) -> String {
        self.audience
            .clone()
            .unwrap_or_else(|| self.user_info_url())
    }
}
