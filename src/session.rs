//! Session lifecycle state machine.
//!
//! Per session the states are **NoSession**, **Anonymous**, and **Secure**.
//! Secure is terminal for a browser session; the others are transient. The
//! upgrade transition is the single place the anonymous and secure cookie
//! pairs are swapped, and it reuses the session ID so in-flight cookies stay
//! valid across the overwrite.

use crate::cookies::SessionCookies;
use crate::error::{AuthError, RejectionReason, Result};
use crate::jwt::JwtClaims;
use crate::providers::{SessionStore, UserDirectory};
use crate::state::{AuthenticatedUser, SessionDocument, SessionId};

/// Outcome of the require-auth composition.
#[derive(Debug, Clone, PartialEq)]
pub enum RequireAuth {
    /// The request carries a valid secure session; identity attached.
    Authenticated(AuthenticatedUser),

    /// The request was rejected for an enumerated reason; redirect here.
    Redirect(String),
}

/// Session lifecycle engine.
///
/// Holds no mutable state beyond its injected stores; one value serves many
/// concurrent request tasks.
#[derive(Debug, Clone)]
pub struct SessionLifecycle<S, U>
where
    S: SessionStore + Clone,
    U: UserDirectory + Clone,
{
    sessions: S,
    users: U,
}

impl<S, U> SessionLifecycle<S, U>
where
    S: SessionStore + Clone,
    U: UserDirectory + Clone,
{
    /// Create a lifecycle engine over the given stores.
    #[must_use]
    pub const fn new(sessions: S, users: U) -> Self {
        Self { sessions, users }
    }

    /// Begin an anonymous session, or continue an existing one.
    ///
    /// If the request already carries an anonymous cookie its session ID is
    /// reused, so repeated flow starts keep one session; otherwise a fresh
    /// ID is minted. The anonymous cookie pair is (re)written and an
    /// `Anonymous` document carrying the supplied claims is upserted.
    ///
    /// # Errors
    ///
    /// Propagates cookie decryption failures (a tampered existing cookie
    /// fails closed) and store errors.
    pub async fn begin_anonymous_session(
        &self,
        jar: &mut SessionCookies,
        id_token: Option<JwtClaims>,
    ) -> Result<SessionId> {
        let session_id = if jar.has_anonymous_session_cookie() {
            jar.anonymous_session_id()?
        } else {
            SessionId::new()
        };

        jar.set_anonymous_session_cookie(session_id)?;
        self.sessions
            .upsert(session_id, SessionDocument::Anonymous { id_token })
            .await?;

        tracing::info!(session_id = %session_id, "anonymous session begun");
        Ok(session_id)
    }

    /// Upgrade the request's anonymous session to a secure one.
    ///
    /// Requires a stored `Anonymous` document whose claims carry an email.
    /// The session ID is reused: the anonymous cookie pair is cleared and
    /// the secure pair is set with the same ID in the same response, the
    /// user directory resolves the claims to a local user, and the store
    /// entry is overwritten with a `Secure` document.
    ///
    /// Returns `Ok(None)` when the request carries no anonymous cookie but
    /// does carry a secure one: the session is already upgraded and the
    /// authentication check decides.
    ///
    /// Replaying a stale anonymous cookie against an already-`Secure`
    /// document is rejected, not treated as idempotent: a client presenting
    /// only the weaker anonymous credential after upgrade must
    /// re-authenticate.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionRejected`] with
    /// [`RejectionReason::AnonymousSessionMissing`] when neither cookie is
    /// present and [`RejectionReason::AnonymousSessionInvalid`] when the
    /// stored document is missing, unusable, or already upgraded. Store and
    /// crypto errors propagate.
    pub async fn upgrade_session(
        &self,
        jar: &mut SessionCookies,
    ) -> Result<Option<AuthenticatedUser>> {
        if !jar.has_anonymous_session_cookie() {
            if jar.has_secure_session_cookie() {
                return Ok(None);
            }
            return Err(AuthError::SessionRejected(
                RejectionReason::AnonymousSessionMissing,
            ));
        }

        let session_id = jar.anonymous_session_id()?;

        let claims = match self.sessions.get(session_id).await? {
            Some(SessionDocument::Anonymous { id_token: Some(claims) }) => claims,
            Some(SessionDocument::Anonymous { id_token: None }) | None => {
                tracing::warn!(
                    session_id = %session_id,
                    reason = RejectionReason::AnonymousSessionInvalid.as_str(),
                    "upgrade rejected: no usable anonymous document"
                );
                return Err(AuthError::SessionRejected(
                    RejectionReason::AnonymousSessionInvalid,
                ));
            }
            Some(SessionDocument::Secure { .. }) => {
                // Stale anonymous cookie replayed against an upgraded
                // session.
                tracing::warn!(
                    session_id = %session_id,
                    reason = RejectionReason::AnonymousSessionInvalid.as_str(),
                    "upgrade rejected: session already secure"
                );
                return Err(AuthError::SessionRejected(
                    RejectionReason::AnonymousSessionInvalid,
                ));
            }
        };

        let Some(email) = claims.email.as_deref() else {
            tracing::warn!(
                session_id = %session_id,
                reason = RejectionReason::AnonymousSessionInvalid.as_str(),
                "upgrade rejected: claims carry no email"
            );
            return Err(AuthError::SessionRejected(
                RejectionReason::AnonymousSessionInvalid,
            ));
        };

        let user = self.users.get_or_create(email, &claims.sub).await?;

        // The single place the two cookie pairs are swapped: clear the
        // anonymous pair and set the secure pair, same ID, same response.
        jar.remove_anonymous_session_cookie()?;
        jar.set_secure_session_cookie(session_id)?;

        self.sessions
            .upsert(
                session_id,
                SessionDocument::Secure {
                    email: user.email.clone(),
                    user_id: user.id,
                    providers: user.providers.clone(),
                },
            )
            .await?;

        tracing::info!(
            session_id = %session_id,
            user_id = %user.id,
            "session upgraded to secure"
        );
        Ok(Some(AuthenticatedUser {
            session_id,
            user_id: user.id,
            email: user.email,
            providers: user.providers,
        }))
    }

    /// Check the request's secure session and resolve its identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionRejected`] with
    /// [`RejectionReason::SecureSessionMissing`] when the secure cookie pair
    /// is absent and [`RejectionReason::SecureSessionInvalid`] when the
    /// stored document is missing or not secure.
    pub async fn authenticate(&self, jar: &SessionCookies) -> Result<AuthenticatedUser> {
        if !jar.has_secure_session_cookie() {
            return Err(AuthError::SessionRejected(
                RejectionReason::SecureSessionMissing,
            ));
        }

        let session_id = jar.secure_session_id()?;

        match self.sessions.get(session_id).await? {
            Some(SessionDocument::Secure { email, user_id, providers }) => Ok(AuthenticatedUser {
                session_id,
                user_id,
                email,
                providers,
            }),
            _ => {
                tracing::warn!(
                    session_id = %session_id,
                    reason = RejectionReason::SecureSessionInvalid.as_str(),
                    "authentication rejected"
                );
                Err(AuthError::SessionRejected(
                    RejectionReason::SecureSessionInvalid,
                ))
            }
        }
    }

    /// Compose upgrade and authentication into a require-auth check.
    ///
    /// Attempts the upgrade, then the authentication check. Any enumerated
    /// rejection turns into `RequireAuth::Redirect(login_path)`; success
    /// attaches the resolved identity. Non-protocol errors (storage,
    /// crypto) propagate as `Err`.
    ///
    /// # Errors
    ///
    /// Returns engine faults only; rejections are folded into the redirect
    /// outcome.
    pub async fn require_authenticated(
        &self,
        jar: &mut SessionCookies,
        login_path: &str,
    ) -> Result<RequireAuth> {
        if jar.has_no_session_cookie() {
            tracing::warn!(
                reason = RejectionReason::MissingSession.as_str(),
                "request carries no session cookie"
            );
            return Ok(RequireAuth::Redirect(login_path.to_string()));
        }

        match self.upgrade_session(jar).await {
            // Upgraded within this request; the identity is already
            // resolved and the secure cookie is pending on the response.
            Ok(Some(user)) => return Ok(RequireAuth::Authenticated(user)),
            // Already upgraded; fall through to the authentication check.
            Ok(None) => {}
            Err(AuthError::SessionRejected(reason)) => {
                tracing::warn!(reason = reason.as_str(), "require-auth rejected at upgrade");
                return Ok(RequireAuth::Redirect(login_path.to_string()));
            }
            Err(other) => return Err(other),
        }

        match self.authenticate(jar).await {
            Ok(user) => Ok(RequireAuth::Authenticated(user)),
            Err(AuthError::SessionRejected(reason)) => {
                tracing::warn!(
                    reason = reason.as_str(),
                    "require-auth rejected at authentication"
                );
                Ok(RequireAuth::Redirect(login_path.to_string()))
            }
            Err(other) => Err(other),
        }
    }

    /// End the request's secure session.
    ///
    /// Clears the secure cookie pair and deletes the session document.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionCookieMissing`] if the request does not
    /// carry the secure pair.
    pub async fn end_session(&self, jar: &mut SessionCookies) -> Result<()> {
        let session_id = jar.secure_session_id()?;

        jar.remove_secure_session_cookie()?;
        self.sessions.delete(session_id).await?;

        tracing::info!(session_id = %session_id, "session ended");
        Ok(())
    }
}
