//! Shared types for the API layer.

use std::sync::Arc;

use crate::api::error::ApiError;
use crate::auth::{AuthContext, TokenSigner};
use crate::referral::{EtaPolicy, RandomEta};
use crate::store::Store;

/// Shared context for all API routes and middleware: the document store, the
/// token signer, and the pluggable arrival-time policy.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<Store>,
    pub signer: TokenSigner,
    pub eta: Arc<dyn EtaPolicy>,
}

impl ApiContext {
    pub fn new(store: Arc<Store>, signer: TokenSigner) -> Self {
        Self {
            store,
            signer,
            eta: Arc::new(RandomEta),
        }
    }

    /// Swap the arrival-time estimator (tests, future travel-time model).
    pub fn with_eta_policy(mut self, eta: Arc<dyn EtaPolicy>) -> Self {
        self.eta = eta;
        self
    }
}

/// Gate for administrative operations.
pub fn require_admin(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}
