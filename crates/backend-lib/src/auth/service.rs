// ============================
// goaltrack-backend-lib/src/auth/service.rs
// ============================
//! Auth flow: registration and login.
use std::sync::Arc;

use metrics::counter;

use crate::auth::password::{hash_password_secure, verify_password};
use crate::auth::token::TokenService;
use crate::error::AppError;
use crate::metrics as keys;
use crate::store::{NewIdentity, Store};
use crate::validation::{normalize_email, validate_email, validate_password, validate_username};
use goaltrack_common::PublicIdentity;

const DUPLICATE_EMAIL: &str = "User already exists with this email";

/// Orchestrates registration and login against the store and the
/// token service. Read-only consumers of identities (the authorization
/// gate, goal handlers) go to the store directly; this service is the
/// sole identity writer.
pub struct AuthService<S: Store> {
    store: Arc<S>,
    tokens: Arc<TokenService>,
}

impl<S: Store> AuthService<S> {
    pub fn new(store: Arc<S>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Register a new identity.
    ///
    /// Validates, pre-checks email uniqueness, hashes the password off
    /// the async path, and persists. The store re-checks uniqueness
    /// under its own lock, so a concurrent duplicate still fails.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicIdentity, AppError> {
        let username = username.trim().to_string();
        let email = normalize_email(email);
        let password = password.trim().to_string();

        validate_username(&username)?;
        validate_email(&email)?;
        validate_password(&password)?;

        if self.store.find_identity_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }

        // scrypt is CPU-bound; keep it off the request-handling threads
        let password_hash = tokio::task::spawn_blocking(move || {
            let mut plain = password;
            hash_password_secure(&mut plain)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        let record = self
            .store
            .create_identity(NewIdentity {
                username,
                email,
                password_hash,
            })
            .await?;

        counter!(keys::AUTH_REGISTERED).increment(1);
        tracing::info!(identity_id = %record.id, username = %record.username, "identity registered");

        Ok(PublicIdentity::from(&record))
    }

    /// Authenticate and mint a token.
    ///
    /// Unknown email and wrong password return the identical error so
    /// the caller cannot probe which emails are registered.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, PublicIdentity), AppError> {
        let email = normalize_email(email);
        let password = password.trim().to_string();

        validate_email(&email)?;
        validate_password(&password)?;

        let Some(record) = self.store.find_identity_by_email(&email).await? else {
            counter!(keys::AUTH_LOGIN_REJECTED).increment(1);
            return Err(AppError::InvalidCredentials);
        };

        let stored_hash = record.password_hash.clone();
        let correct =
            tokio::task::spawn_blocking(move || verify_password(&stored_hash, &password))
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;

        if !correct {
            counter!(keys::AUTH_LOGIN_REJECTED).increment(1);
            tracing::warn!(identity_id = %record.id, "failed login attempt");
            return Err(AppError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(record.id, &record.email)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        counter!(keys::AUTH_LOGIN_OK).increment(1);
        tracing::info!(identity_id = %record.id, "identity logged in");

        Ok((token, PublicIdentity::from(&record)))
    }
}
