// ============================
// goaltrack-backend-lib/src/handlers/goals.rs
// ============================
//! Goal CRUD endpoints. All of them sit behind the authorization gate
//! and operate only on goals owned by the resolved identity.
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use metrics::counter;
use uuid::Uuid;

use crate::error::AppError;
use crate::metrics as keys;
use crate::middleware::AuthContext;
use crate::store::{GoalPatch, NewGoal, Store};
use crate::validation::{validate_description, validate_progress, validate_title};
use crate::AppState;
use goaltrack_common::{CreateGoalRequest, Goal, MessageResponse, UpdateGoalRequest};

const GOAL_NOT_FOUND: &str = "Goal not found";

/// `POST /goals`
pub async fn create_goal<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<Goal>), AppError> {
    let title = body.title.trim().to_string();
    validate_title(&title)?;

    let description = body.description.unwrap_or_default().trim().to_string();
    validate_description(&description)?;

    let progress = body.progress.unwrap_or(0);
    validate_progress(progress)?;

    let goal = state
        .store
        .create_goal(NewGoal {
            owner_id: ctx.identity_id,
            title,
            description,
            target_date: body.target_date,
            progress,
        })
        .await?;

    counter!(keys::GOAL_CREATED).increment(1);
    tracing::debug!(goal_id = %goal.id, owner_id = %ctx.identity_id, "goal created");

    Ok((StatusCode::CREATED, Json(goal)))
}

/// `GET /goals`
pub async fn list_goals<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<Goal>>, AppError> {
    let goals = state.store.list_goals(ctx.identity_id).await?;
    Ok(Json(goals))
}

/// `GET /goals/{goal_id}`
pub async fn get_goal<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(ctx): Extension<AuthContext>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<Goal>, AppError> {
    let goal = state
        .store
        .find_goal(ctx.identity_id, goal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(GOAL_NOT_FOUND.to_string()))?;
    Ok(Json(goal))
}

/// `PUT /goals/{goal_id}`
///
/// Partial update: absent fields are untouched, and an explicit
/// `progress: 0` resets progress rather than being dropped.
pub async fn update_goal<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(ctx): Extension<AuthContext>,
    Path(goal_id): Path<Uuid>,
    Json(body): Json<UpdateGoalRequest>,
) -> Result<Json<Goal>, AppError> {
    let title = match body.title {
        Some(title) => {
            let title = title.trim().to_string();
            validate_title(&title)?;
            Some(title)
        },
        None => None,
    };

    let description = match body.description {
        Some(description) => {
            let description = description.trim().to_string();
            validate_description(&description)?;
            Some(description)
        },
        None => None,
    };

    if let Some(progress) = body.progress {
        validate_progress(progress)?;
    }

    let patch = GoalPatch {
        title,
        description,
        target_date: body.target_date,
        progress: body.progress,
    };

    let goal = state
        .store
        .update_goal(ctx.identity_id, goal_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(GOAL_NOT_FOUND.to_string()))?;
    Ok(Json(goal))
}

/// `DELETE /goals/{goal_id}`
pub async fn delete_goal<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(ctx): Extension<AuthContext>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = state.store.delete_goal(ctx.identity_id, goal_id).await?;
    if !deleted {
        return Err(AppError::NotFound(GOAL_NOT_FOUND.to_string()));
    }

    counter!(keys::GOAL_DELETED).increment(1);
    Ok(Json(MessageResponse {
        message: "Goal deleted successfully".to_string(),
    }))
}
