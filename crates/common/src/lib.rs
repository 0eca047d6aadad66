// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! shared between the `GoalTrack` browser client and the REST backend.
//! This module defines the JSON request/response bodies for every endpoint.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of a registered identity.
///
/// The password hash is a server-side field and is never part of this
/// type, so it cannot appear in any outbound representation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicIdentity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A fitness goal, always scoped to its owner.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub target_date: Option<NaiveDate>,
    /// Completion percentage, 0-100
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /auth/register`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/login`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub message: String,
    /// Bearer token for subsequent requests
    pub token: String,
    pub user: PublicIdentity,
}

/// Body of `POST /goals`
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub progress: Option<u8>,
}

/// Body of `PUT /goals/{goalId}`.
///
/// Every field is optional; absent fields are left untouched. An
/// explicit `progress: 0` is a valid reset, distinct from omitting the
/// field entirely.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub progress: Option<u8>,
}

/// Plain acknowledgment body (e.g. `DELETE /goals/{goalId}`)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

/// Uniform error body returned by every endpoint
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    pub message: String,
    /// HTTP status code
    pub code: u16,
    #[serde(rename = "statusText")]
    pub status_text: String,
}
