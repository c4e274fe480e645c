//! Authorization-code token exchange.
//!
//! The provider's token endpoint is an external HTTPS collaborator behind
//! the [`TokenExchanger`] trait, with one `reqwest`-backed production
//! implementation. Timeouts are the injected client's responsibility.

use crate::config::OAuth2Config;
use crate::constants::oauth;
use crate::error::{AuthError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Token endpoint response triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token for provider API requests.
    pub access_token: String,

    /// Refresh token, if the provider issued one. Refresh itself is out of
    /// scope for this engine.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// ID token (JWT) carrying the user's identity claims.
    pub id_token: String,
}

/// Token exchanger.
///
/// Posts the authorization code to the provider's token endpoint and returns
/// its token triple.
pub trait TokenExchanger: Send + Sync {
    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenExchangeFailed`] on a non-OK response and
    /// [`AuthError::Transport`] if the request cannot be sent. The
    /// orchestrator catches these (fail-open); they never crash a host.
    fn exchange_code(
        &self,
        code: &str,
    ) -> impl std::future::Future<Output = Result<TokenResponse>> + Send;
}

/// `reqwest`-backed token exchanger.
#[derive(Debug, Clone)]
pub struct HttpTokenExchanger {
    config: OAuth2Config,
    http_client: Client,
}

impl HttpTokenExchanger {
    /// Create an exchanger for the configured provider.
    #[must_use]
    pub fn new(config: OAuth2Config) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }

    /// Use a caller-configured HTTP client (timeouts, proxies, TLS).
    #[must_use]
    pub fn with_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }
}

impl TokenExchanger for HttpTokenExchanger {
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let params = [
            ("grant_type", oauth::GRANT_TYPE),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.config.callback_url.as_str()),
        ];

        let response = self
            .http_client
            .post(self.config.token_url())
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(status, "token exchange returned non-OK status");
            return Err(AuthError::TokenExchangeFailed { status, detail });
        }

        // A malformed body from the provider is an upstream failure, not an
        // engine fault; it must stay on the fail-open path.
        let status = response.status().as_u16();
        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::TokenExchangeFailed {
                status,
                detail: format!("malformed token response: {e}"),
            })
    }
}
