//! OAuth2 authorization-code flow orchestration.
//!
//! `start` issues the CSRF-protected redirect; `complete` runs the callback
//! as a linear sequence of awaited steps (verify CSRF → exchange token →
//! verify signature → validate claims → persist the anonymous session), each
//! returning a typed outcome so every failure mode is independently
//! assertable.

use crate::config::OAuth2Config;
use crate::constants::oauth;
use crate::cookies::SessionCookies;
use crate::error::{AuthError, Result};
use crate::jwt::validate_claims;
use crate::providers::{CsrfTokenStore, JwtVerifier, SessionStore, TokenExchanger, UserDirectory};
use crate::session::SessionLifecycle;
use crate::state::SessionId;
use serde::Deserialize;

/// Query parameters of the provider's callback request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    /// Authorization code to exchange.
    pub code: String,

    /// CSRF `state` parameter issued at flow start.
    pub state: String,
}

/// Result of [`OAuth2Orchestrator::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRedirect {
    /// Provider authorization URL to redirect the user agent to.
    pub location: String,

    /// The anonymous session begun (or continued) for this flow.
    pub session_id: SessionId,
}

/// Typed outcome of [`OAuth2Orchestrator::complete`].
#[derive(Debug, Clone, PartialEq)]
pub enum CompleteOutcome {
    /// The identity token was validated and the anonymous session carries
    /// its claims. The host continues the pipeline without a redirect; its
    /// next route performs the upgrade or decides where to send the user.
    Authenticated {
        /// The session now holding the validated claims.
        session_id: SessionId,
    },

    /// The `state` parameter failed CSRF verification. The host redirects
    /// to the site root and stops; the token exchange never runs.
    CsrfRejected,

    /// A post-CSRF step failed (token exchange, signature, claims). The
    /// flow fails open: the host's next handler renders a failure page. The
    /// cause keeps each failure mode assertable.
    FailedOpen {
        /// The upstream or JWT error that was caught.
        cause: AuthError,
    },
}

/// OAuth2 authorization-code flow orchestrator.
///
/// Constructed once at startup; holds no mutable state beyond its frozen
/// configuration, so "already configured" is unrepresentable.
#[derive(Debug, Clone)]
pub struct OAuth2Orchestrator<C, T, J, S, U>
where
    C: CsrfTokenStore,
    T: TokenExchanger,
    J: JwtVerifier,
    S: SessionStore + Clone,
    U: UserDirectory + Clone,
{
    config: OAuth2Config,
    csrf: C,
    exchanger: T,
    verifier: J,
    lifecycle: SessionLifecycle<S, U>,
}

impl<C, T, J, S, U> OAuth2Orchestrator<C, T, J, S, U>
where
    C: CsrfTokenStore,
    T: TokenExchanger,
    J: JwtVerifier,
    S: SessionStore + Clone,
    U: UserDirectory + Clone,
{
    /// Create an orchestrator over the configured collaborators.
    #[must_use]
    pub const fn new(
        config: OAuth2Config,
        csrf: C,
        exchanger: T,
        verifier: J,
        lifecycle: SessionLifecycle<S, U>,
    ) -> Self {
        Self {
            config,
            csrf,
            exchanger,
            verifier,
            lifecycle,
        }
    }

    /// Start the authorization-code flow.
    ///
    /// Issues a CSRF token, builds the provider authorization URL with
    /// exactly `audience`, `client_id`, `redirect_uri`, `response_type`,
    /// `scope`, and `state`, and begins (or continues) the anonymous
    /// session.
    ///
    /// # Errors
    ///
    /// Returns store, crypto, or encoding errors; `start` has no fail-open
    /// path.
    pub async fn start(&self, jar: &mut SessionCookies) -> Result<AuthorizationRedirect> {
        let state = self.csrf.issue().await?;
        let audience = self.config.audience();

        let query = serde_urlencoded::to_string([
            ("audience", audience.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.callback_url.as_str()),
            ("response_type", oauth::RESPONSE_TYPE),
            ("scope", oauth::SCOPE),
            ("state", state.as_str()),
        ])
        .map_err(|e| AuthError::Internal(format!("failed to encode authorize query: {e}")))?;

        let session_id = self.lifecycle.begin_anonymous_session(jar, None).await?;

        tracing::info!(session_id = %session_id, "authorization flow started");
        Ok(AuthorizationRedirect {
            location: format!("{}?{query}", self.config.authorize_url()),
            session_id,
        })
    }

    /// Complete the authorization-code flow from the provider callback.
    ///
    /// Verifies the CSRF `state` first; on failure the outcome is
    /// [`CompleteOutcome::CsrfRejected`] and the token exchange never runs.
    /// The remaining steps fail open: upstream and JWT errors are caught
    /// and surfaced as [`CompleteOutcome::FailedOpen`].
    ///
    /// # Errors
    ///
    /// `Err` is reserved for engine faults (store I/O, crypto misuse);
    /// every expected failure mode is a typed outcome.
    pub async fn complete(
        &self,
        jar: &mut SessionCookies,
        callback: &CallbackParams,
    ) -> Result<CompleteOutcome> {
        if !self.csrf.verify(&callback.state).await? {
            tracing::warn!("callback state parameter rejected");
            return Ok(CompleteOutcome::CsrfRejected);
        }

        match self.validate_and_persist(jar, callback).await {
            Ok(session_id) => {
                tracing::info!(session_id = %session_id, "authorization flow completed");
                Ok(CompleteOutcome::Authenticated { session_id })
            }
            Err(cause)
                if cause.is_upstream_error()
                    || cause.is_signature_error()
                    || cause.is_claims_error() =>
            {
                tracing::debug!(error = %cause, "completion failed open");
                Ok(CompleteOutcome::FailedOpen { cause })
            }
            Err(fault) => Err(fault),
        }
    }

    async fn validate_and_persist(
        &self,
        jar: &mut SessionCookies,
        callback: &CallbackParams,
    ) -> Result<SessionId> {
        let tokens = self.exchanger.exchange_code(&callback.code).await?;
        let claims = self.verifier.verify_signature(&tokens.id_token).await?;
        validate_claims(&claims, &self.config.domain, &self.config.client_id)?;

        self.lifecycle.begin_anonymous_session(jar, Some(claims)).await
    }
}
