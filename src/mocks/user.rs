//! Mock user directory for testing.

use crate::error::{AuthError, Result};
use crate::providers::UserDirectory;
use crate::state::{UserId, UserRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock user directory.
///
/// In-memory get-or-create keyed by email, accumulating provider IDs on the
/// existing record the way a real directory would. Records every call for
/// assertion.
#[derive(Debug, Clone)]
pub struct MockUserDirectory {
    users: Arc<Mutex<HashMap<String, UserRecord>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockUserDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Seed an existing user record.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn with_user(self, record: UserRecord) -> Self {
        self.users.lock().unwrap().insert(record.email.clone(), record);
        self
    }

    /// `(email, provider_id)` pairs seen so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDirectory for MockUserDirectory {
    async fn get_or_create(&self, email: &str, provider_id: &str) -> Result<UserRecord> {
        self.calls
            .lock()
            .map_err(|_| AuthError::Internal("mock directory mutex poisoned".to_string()))?
            .push((email.to_string(), provider_id.to_string()));

        let mut users = self
            .users
            .lock()
            .map_err(|_| AuthError::Internal("mock directory mutex poisoned".to_string()))?;

        let record = users
            .entry(email.to_string())
            .or_insert_with(|| UserRecord {
                id: UserId::new(),
                email: email.to_string(),
                providers: Vec::new(),
            });

        if !record.providers.iter().any(|p| p == provider_id) {
            record.providers.push(provider_id.to_string());
        }

        Ok(record.clone())
    }
}
