// ============================
// goaltrack-backend-lib/src/handlers/auth.rs
// ============================
//! Registration and login endpoints.
use std::sync::Arc;

use axum::{extract::State, Json};

use crate::error::AppError;
use crate::store::Store;
use crate::AppState;
use goaltrack_common::{LoginRequest, LoginResponse, PublicIdentity, RegisterRequest};

/// `POST /auth/register`
pub async fn register<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<PublicIdentity>, AppError> {
    let user = state
        .auth
        .register(&body.username, &body.email, &body.password)
        .await?;
    Ok(Json(user))
}

/// `POST /auth/login`
pub async fn login<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (token, user) = state.auth.login(&body.email, &body.password).await?;
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user,
    }))
}
