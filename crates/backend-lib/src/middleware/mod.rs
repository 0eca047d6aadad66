// crates/backend-lib/src/middleware/mod.rs

//! Authorization gate for the goal-management routes.
//!
//! Every failure mode is terminal: the request never reaches a
//! handler without a resolved identity in its extensions.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use metrics::counter;
use uuid::Uuid;

use crate::auth::token::TokenError;
use crate::error::AppError;
use crate::metrics as keys;
use crate::store::Store;
use crate::AppState;

#[cfg(test)]
mod tests;

/// Identity resolved by the gate, available to downstream handlers
/// through the request extensions.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity_id: Uuid,
    pub email: String,
}

fn reject(message: &str) -> AppError {
    counter!(keys::AUTH_GATE_REJECTED).increment(1);
    AppError::Unauthenticated(message.to_string())
}

/// Extract the bearer token, verify it, and resolve it to a live
/// identity record.
///
/// Resolution runs against current store state on every request: a
/// token stays cryptographically valid until expiry, but a deleted
/// account is rejected immediately.
pub async fn require_auth<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(header) = request.headers().get(AUTHORIZATION) else {
        return Err(reject("No token provided"));
    };

    let Ok(header) = header.to_str() else {
        return Err(reject("Invalid token format"));
    };

    // exactly `Bearer <token>`, nothing else
    let parts: Vec<&str> = header.split(' ').collect();
    if parts.len() != 2 || parts[0] != "Bearer" {
        return Err(reject("Invalid token format"));
    }

    let token = parts[1].trim();
    if token.is_empty() {
        return Err(reject("Token is empty"));
    }

    let claims = state.tokens.verify(token).map_err(|err| match err {
        TokenError::Expired => reject("Token expired"),
        TokenError::Invalid => reject("Invalid token"),
        TokenError::Payload => reject("Invalid token payload"),
    })?;

    let Ok(identity_id) = claims.sub.parse::<Uuid>() else {
        return Err(reject("Invalid token payload"));
    };

    let Some(record) = state.store.find_identity_by_id(identity_id).await? else {
        return Err(reject("User not found"));
    };

    request.extensions_mut().insert(AuthContext {
        identity_id: record.id,
        email: record.email,
    });

    Ok(next.run(request).await)
}
