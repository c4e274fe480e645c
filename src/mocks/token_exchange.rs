//! Mock token exchanger for testing.

use crate::error::{AuthError, Result};
use crate::providers::{TokenExchanger, TokenResponse};
use std::sync::{Arc, Mutex};

/// Mock token exchanger.
///
/// Returns a configured response (or failure) and records every exchanged
/// code. The default configuration fails with a 500, mimicking an
/// unreachable token endpoint.
#[derive(Debug, Clone)]
pub struct MockTokenExchanger {
    response: Arc<Mutex<std::result::Result<TokenResponse, AuthError>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockTokenExchanger {
    /// Create an exchanger that fails every exchange.
    #[must_use]
    pub fn new() -> Self {
        Self {
            response: Arc::new(Mutex::new(Err(AuthError::TokenExchangeFailed {
                status: 500,
                detail: "mock exchanger not configured".to_string(),
            }))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Succeed with a token triple carrying the given ID token.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn with_id_token(self, id_token: &str) -> Self {
        *self.response.lock().unwrap() = Ok(TokenResponse {
            access_token: "mock-access-token".to_string(),
            refresh_token: Some("mock-refresh-token".to_string()),
            id_token: id_token.to_string(),
        });
        self
    }

    /// Fail every exchange with the given status.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn with_failure(self, status: u16, detail: &str) -> Self {
        *self.response.lock().unwrap() = Err(AuthError::TokenExchangeFailed {
            status,
            detail: detail.to_string(),
        });
        self
    }

    /// Authorization codes exchanged so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn exchanged_codes(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockTokenExchanger {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenExchanger for MockTokenExchanger {
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        self.calls
            .lock()
            .map_err(|_| AuthError::Internal("mock exchanger mutex poisoned".to_string()))?
            .push(code.to_string());

        self.response
            .lock()
            .map_err(|_| AuthError::Internal("mock exchanger mutex poisoned".to_string()))?
            .clone()
    }
}
