// ============================
// goaltrack-backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the `GoalTrack` REST server:
//! authentication, authorization, and goal management.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod store;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthService, TokenService};
use crate::config::Settings;
use crate::store::Store;

/// Application state shared across all handlers
pub struct AppState<S: Store> {
    /// Storage backend, single handle shared by every request
    pub store: Arc<S>,
    /// Auth flow (registration, login)
    pub auth: AuthService<S>,
    /// Token issuance and verification
    pub tokens: Arc<TokenService>,
    /// Settings, read-only after startup
    pub settings: Arc<Settings>,
}

impl<S: Store> AppState<S> {
    /// Create a new application state
    pub fn new(store: S, settings: Settings) -> Self {
        let store = Arc::new(store);
        let tokens = Arc::new(TokenService::new(
            &settings.jwt_secret,
            settings.jwt_expires_in,
        ));
        let auth = AuthService::new(store.clone(), tokens.clone());

        Self {
            store,
            auth,
            tokens,
            settings: Arc::new(settings),
        }
    }
}
