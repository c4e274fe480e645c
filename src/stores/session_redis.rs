//! Redis-based session store.
//!
//! Session documents are stored under `aegis:session:{session_id}` as
//! bincode-encoded values with a configurable TTL, giving hosts a
//! distributed expiry policy without touching orchestration logic.

use crate::error::{AuthError, Result};
use crate::providers::session::SessionStore;
use crate::state::{SessionDocument, SessionId};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

const DEFAULT_TTL_SECONDS: u64 = 90 * 24 * 60 * 60;

/// Redis-based session store.
///
/// # Thread Safety
///
/// `Clone` shares the same `ConnectionManager` (connection pool).
pub struct RedisSessionStore {
    conn_manager: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    /// Create a new Redis session store.
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

        tracing::info!("RedisSessionStore initialized");

        Ok(Self {
            conn_manager,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        })
    }

    /// Set the session document TTL.
    ///
    /// Default: 90 days, matching the session cookie's `Max-Age`.
    #[must_use]
    pub const fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    fn session_key(session_id: SessionId) -> String {
        format!("aegis:session:{session_id}")
    }
}

impl Clone for RedisSessionStore {
    fn clone(&self) -> Self {
        Self {
            conn_manager: self.conn_manager.clone(),
            ttl_seconds: self.ttl_seconds,
        }
    }
}

impl SessionStore for RedisSessionStore {
    async fn get(&self, session_id: SessionId) -> Result<Option<SessionDocument>> {
        let mut conn = self.conn_manager.clone();

        let bytes: Option<Vec<u8>> = conn
            .get(Self::session_key(session_id))
            .await
            .map_err(|e| AuthError::Storage(format!("failed to get session document: {e}")))?;

        bytes
            .map(|bytes| {
                bincode::deserialize(&bytes)
                    .map_err(|e| AuthError::Serialization(e.to_string()))
            })
            .transpose()
    }

    async fn upsert(&self, session_id: SessionId, document: SessionDocument) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let bytes = bincode::serialize(&document)
            .map_err(|e| AuthError::Serialization(e.to_string()))?;

        // SETEX replaces the whole value atomically, preserving the
        // one-document-per-ID invariant.
        let _: () = conn
            .set_ex(Self::session_key(session_id), bytes, self.ttl_seconds)
            .await
            .map_err(|e| AuthError::Storage(format!("failed to store session document: {e}")))?;

        tracing::debug!(
            session_id = %session_id,
            kind = %document.kind(),
            "stored session document"
        );

        Ok(())
    }

    async fn delete(&self, session_id: SessionId) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let _: () = conn
            .del(Self::session_key(session_id))
            .await
            .map_err(|e| AuthError::Storage(format!("failed to delete session document: {e}")))?;

        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let keys: Vec<String> = conn
            .keys("aegis:session:*")
            .await
            .map_err(|e| AuthError::Storage(format!("failed to list session documents: {e}")))?;

        if !keys.is_empty() {
            let _: () = conn.del(keys).await.map_err(|e| {
                AuthError::Storage(format!("failed to clear session documents: {e}"))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::jwt::JwtClaims;
    use crate::state::UserId;

    #[tokio::test]
    #[ignore] // Requires Redis running
    #[allow(clippy::unwrap_used)]
    async fn test_redis_session_document_lifecycle() {
        let store = RedisSessionStore::new("redis://127.0.0.1:6379")
            .await
            .unwrap();
        let id = SessionId::new();

        let claims = JwtClaims {
            iss: "https://auth.example.com/".to_string(),
            aud: "client-1".to_string(),
            exp: 4_000_000_000,
            iat: 1_700_000_000,
            sub: "p|1".to_string(),
            email: Some("a@b.com".to_string()),
            email_verified: Some(true),
        };

        store
            .upsert(id, SessionDocument::Anonymous { id_token: Some(claims.clone()) })
            .await
            .unwrap();
        assert_eq!(
            store.get(id).await.unwrap(),
            Some(SessionDocument::Anonymous { id_token: Some(claims) })
        );

        // Upsert replaces the whole document under the same ID.
        store
            .upsert(
                id,
                SessionDocument::Secure {
                    email: "a@b.com".to_string(),
                    user_id: UserId::new(),
                    providers: vec!["p|1".to_string()],
                },
            )
            .await
            .unwrap();
        assert!(store.get(id).await.unwrap().unwrap().is_secure());

        store.delete(id).await.unwrap();
        assert!(store.get(id).await.unwrap().is_none());
    }
}
