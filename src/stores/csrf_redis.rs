//! Redis-based CSRF token store.
//!
//! Tokens are stored under `aegis:csrf:{token}` with an issue-side TTL, so
//! flows abandoned mid-redirect expire server-side instead of orphaning
//! forever. Verification is a single GETDEL round-trip plus a constant-time
//! comparison of the stored value.

use crate::error::{AuthError, Result};
use crate::providers::csrf::{CsrfTokenStore, new_csrf_token};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

const DEFAULT_TTL_SECONDS: u64 = 15 * 60;

/// Redis-based CSRF token store with atomic consumption.
///
/// # Security
///
/// - **Single-use**: GETDEL consumes the key in one command; concurrent
///   verifications of the same token admit exactly one winner
/// - **Constant-time**: the stored value is compared with
///   `constant_time_eq`, never `==`
/// - **Expiration**: tokens expire after the configured TTL
///
/// # Thread Safety
///
/// `Clone` shares the same `ConnectionManager` (connection pool).
pub struct RedisCsrfTokenStore {
    conn_manager: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisCsrfTokenStore {
    /// Create a new Redis CSRF token store.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or the connection fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| AuthError::Storage(format!("failed to create Redis client: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            AuthError::Storage(format!("failed to create Redis connection manager: {e}"))
        })?;

        tracing::info!("RedisCsrfTokenStore initialized");

        Ok(Self {
            conn_manager,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        })
    }

    /// Set the token TTL.
    ///
    /// Default: 15 minutes.
    #[must_use]
    pub const fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    fn token_key(token: &str) -> String {
        format!("aegis:csrf:{token}")
    }
}

impl Clone for RedisCsrfTokenStore {
    fn clone(&self) -> Self {
        Self {
            conn_manager: self.conn_manager.clone(),
            ttl_seconds: self.ttl_seconds,
        }
    }
}

impl CsrfTokenStore for RedisCsrfTokenStore {
    async fn issue(&self) -> Result<String> {
        let mut conn = self.conn_manager.clone();
        let token = new_csrf_token();

        // SETEX is atomic: SET + EXPIRE in one command.
        let _: () = conn
            .set_ex(Self::token_key(&token), token.clone(), self.ttl_seconds)
            .await
            .map_err(|e| AuthError::Storage(format!("failed to store csrf token: {e}")))?;

        Ok(token)
    }

    async fn verify(&self, token: &str) -> Result<bool> {
        let mut conn = self.conn_manager.clone();

        // GETDEL is atomic: concurrent verifications of the same token see
        // exactly one Some.
        let stored: Option<String> = conn
            .get_del(Self::token_key(token))
            .await
            .map_err(|e| AuthError::Storage(format!("failed to consume csrf token: {e}")))?;

        Ok(stored.is_some_and(|stored| {
            constant_time_eq::constant_time_eq(stored.as_bytes(), token.as_bytes())
        }))
    }

    async fn reset(&self) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let keys: Vec<String> = conn
            .keys("aegis:csrf:*")
            .await
            .map_err(|e| AuthError::Storage(format!("failed to list csrf tokens: {e}")))?;

        if !keys.is_empty() {
            let _: () = conn
                .del(keys)
                .await
                .map_err(|e| AuthError::Storage(format!("failed to clear csrf tokens: {e}")))?;
        }

        Ok(())
    }
}
