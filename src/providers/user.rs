//! User directory trait.

use crate::error::Result;
use crate::state::UserRecord;

/// User directory.
///
/// Opaque collaborator resolving an external identity to a local user
/// record. User persistence itself is out of scope; the engine only consumes
/// this lookup during session upgrade.
pub trait UserDirectory: Send + Sync {
    /// Get or create the local user for an email/provider pair.
    ///
    /// Implementations are expected to accumulate provider IDs: resolving a
    /// known email with a new `provider_id` links the provider to the
    /// existing record rather than creating a duplicate user.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or creation fails.
    fn get_or_create(
        &self,
        email: &str,
        provider_id: &str,
    ) -> impl std::future::Future<Output = Result<UserRecord>> + Send;
}
