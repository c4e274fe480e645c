//! Session store trait.

use crate::error::Result;
use crate::state::{SessionDocument, SessionId};

/// Session document store.
///
/// This trait abstracts over session persistence, mapping session IDs to
/// their single current [`SessionDocument`].
///
/// # Implementation Notes
///
/// - Exactly one document exists per session ID; `upsert` is
///   insert-or-replace of the whole document (the upgrade path replaces an
///   `Anonymous` document with a `Secure` one under the same ID)
/// - Per-key operations must be atomic; interleaved requests against the
///   same ID must not corrupt state
/// - Expiry policy is host-defined and out of scope here
pub trait SessionStore: Send + Sync {
    /// Get the document for a session ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails; an absent document
    /// is `Ok(None)`.
    fn get(
        &self,
        session_id: SessionId,
    ) -> impl std::future::Future<Output = Result<Option<SessionDocument>>> + Send;

    /// Insert or replace the document for a session ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn upsert(
        &self,
        session_id: SessionId,
        document: SessionDocument,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Delete the document for a session ID.
    ///
    /// Deleting an absent document is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn delete(
        &self,
        session_id: SessionId,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Remove all session documents.
    ///
    /// Administrative/test operation only.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn reset(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}
