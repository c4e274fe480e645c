//! In-memory session store.

use crate::error::{AuthError, Result};
use crate::providers::session::SessionStore;
use crate::state::{SessionDocument, SessionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory session store.
///
/// A mutex-guarded map of session documents. Each operation is a single
/// guarded step, so interleaved requests against the same session ID cannot
/// observe a partial write.
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    documents: Arc<Mutex<HashMap<SessionId, SessionDocument>>>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, SessionDocument>>> {
        self.documents
            .lock()
            .map_err(|_| AuthError::Internal("session store mutex poisoned".to_string()))
    }

    /// Number of stored documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the store mutex is poisoned.
    pub fn document_count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: SessionId) -> Result<Option<SessionDocument>> {
        Ok(self.lock()?.get(&session_id).cloned())
    }

    async fn upsert(&self, session_id: SessionId, document: SessionDocument) -> Result<()> {
        self.lock()?.insert(session_id, document);
        Ok(())
    }

    async fn delete(&self, session_id: SessionId) -> Result<()> {
        self.lock()?.remove(&session_id);
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::state::UserId;

    #[tokio::test]
    async fn test_upsert_and_get() {
        let store = InMemorySessionStore::new();
        let id = SessionId::new();

        assert!(store.get(id).await.unwrap().is_none());

        store
            .upsert(id, SessionDocument::Anonymous { id_token: None })
            .await
            .unwrap();

        assert_eq!(
            store.get(id).await.unwrap(),
            Some(SessionDocument::Anonymous { id_token: None })
        );
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_document() {
        let store = InMemorySessionStore::new();
        let id = SessionId::new();
        let user_id = UserId::new();

        store
            .upsert(id, SessionDocument::Anonymous { id_token: None })
            .await
            .unwrap();
        store
            .upsert(
                id,
                SessionDocument::Secure {
                    email: "a@b.com".to_string(),
                    user_id,
                    providers: vec!["p|1".to_string()],
                },
            )
            .await
            .unwrap();

        // Exactly one document per ID: the replacement, never both.
        assert_eq!(store.document_count().unwrap(), 1);
        assert!(store.get(id).await.unwrap().unwrap().is_secure());
    }

    #[tokio::test]
    async fn test_delete_and_reset() {
        let store = InMemorySessionStore::new();
        let id = SessionId::new();

        store
            .upsert(id, SessionDocument::Anonymous { id_token: None })
            .await
            .unwrap();
        store.delete(id).await.unwrap();
        assert!(store.get(id).await.unwrap().is_none());

        // Deleting an absent document is not an error.
        store.delete(id).await.unwrap();

        store
            .upsert(SessionId::new(), SessionDocument::Anonymous { id_token: None })
            .await
            .unwrap();
        store.reset().await.unwrap();
        assert_eq!(store.document_count().unwrap(), 0);
    }
}
