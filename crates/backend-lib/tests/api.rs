// ============================
// goaltrack-backend-lib/tests/api.rs
// ============================
//! End-to-end tests driving the full router over an in-memory store.
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use goaltrack_backend_lib::{
    config::Settings, router::create_router, store::MemoryStore, AppState,
};
use goaltrack_common::{ErrorBody, Goal, LoginResponse, MessageResponse, PublicIdentity};
use serde::de::DeserializeOwned;
use serde_json::json;
use tower::ServiceExt;

fn test_app() -> Router {
    let settings = Settings {
        jwt_secret: "test-secret".to_string(),
        ..Settings::default()
    };
    create_router(Arc::new(AppState::new(MemoryStore::new(), settings)))
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(value.to_string())
        },
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap()
}

async fn register_and_login(app: &Router, username: &str, email: &str) -> (String, PublicIdentity) {
    let (status, _) = request(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": username, "email": email, "password": "longpass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": "longpass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let login: LoginResponse = parse(&body);
    (login.token, login.user)
}

#[tokio::test]
async fn register_login_and_goal_lifecycle() {
    let app = test_app();

    // register
    let (status, body) = request(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "alice01", "email": "a@b.com", "password": "longpass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let raw: serde_json::Value = parse(&body);
    assert_eq!(raw["username"], "alice01");
    assert_eq!(raw["email"], "a@b.com");
    assert!(raw.get("id").is_some());
    assert!(raw.get("createdAt").is_some());
    assert!(raw.get("updatedAt").is_some());
    // the hash never appears in any outbound representation
    assert!(raw.get("passwordHash").is_none());
    assert!(raw.get("password_hash").is_none());

    // login
    let (status, body) = request(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "a@b.com", "password": "longpass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let login: LoginResponse = parse(&body);
    assert!(!login.token.is_empty());
    assert_eq!(login.user.email, "a@b.com");

    let token = login.token.as_str();

    // create
    let (status, body) = request(
        &app,
        "POST",
        "/goals",
        Some(token),
        Some(json!({ "title": "Run 5k", "description": "Couch to 5k", "progress": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let goal: Goal = parse(&body);
    assert_eq!(goal.title, "Run 5k");
    assert_eq!(goal.progress, 10);
    assert_eq!(goal.owner_id, login.user.id);

    // list
    let (status, body) = request(&app, "GET", "/goals", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    let goals: Vec<Goal> = parse(&body);
    assert_eq!(goals.len(), 1);

    // read
    let uri = format!("/goals/{}", goal.id);
    let (status, body) = request(&app, "GET", &uri, Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Goal = parse(&body);
    assert_eq!(fetched.id, goal.id);

    // partial update with an explicit zero progress
    let (status, body) = request(
        &app,
        "PUT",
        &uri,
        Some(token),
        Some(json!({ "progress": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: Goal = parse(&body);
    assert_eq!(updated.progress, 0);
    assert_eq!(updated.title, "Run 5k"); // untouched

    // delete
    let (status, body) = request(&app, "DELETE", &uri, Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    let ack: MessageResponse = parse(&body);
    assert_eq!(ack.message, "Goal deleted successfully");

    // gone now
    let (status, _) = request(&app, "GET", &uri, Some(token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_rejects_duplicates_and_bad_input() {
    let app = test_app();

    let (status, _) = request(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "alice01", "email": "a@b.com", "password": "longpass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // same email, different username
    let (status, body) = request(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "bob_99", "email": "a@b.com", "password": "longpass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: ErrorBody = parse(&body);
    assert_eq!(err.message, "User already exists with this email");

    // short password
    let (status, body) = request(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "carol_7", "email": "c@b.com", "password": "short7c" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: ErrorBody = parse(&body);
    assert_eq!(err.message, "Password must be at least 8 characters");
}

#[tokio::test]
async fn register_normalizes_mixed_case_email() {
    let app = test_app();

    let (status, body) = request(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "alice01", "email": "  Alice@B.Com ", "password": "longpass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let user: PublicIdentity = parse(&body);
    assert_eq!(user.email, "alice@b.com");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = test_app();
    register_and_login(&app, "alice01", "a@b.com").await;

    let (wrong_status, wrong_body) = request(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "a@b.com", "password": "wrongpass9" })),
    )
    .await;
    let (unknown_status, unknown_body) = request(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@b.com", "password": "longpass1" })),
    )
    .await;

    // invalid credentials are a 404, not a 401
    assert_eq!(wrong_status, StatusCode::NOT_FOUND);
    assert_eq!(unknown_status, StatusCode::NOT_FOUND);

    let wrong: ErrorBody = parse(&wrong_body);
    let unknown: ErrorBody = parse(&unknown_body);
    assert_eq!(wrong.message, unknown.message);
    assert_eq!(wrong.code, unknown.code);
}

#[tokio::test]
async fn goals_require_authentication() {
    let app = test_app();

    let (status, body) = request(&app, "GET", "/goals", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let err: ErrorBody = parse(&body);
    assert_eq!(err.message, "Authentication failed: No token provided");
    assert_eq!(err.code, 401);

    // tampered token
    let (token, _) = register_and_login(&app, "alice01", "a@b.com").await;
    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let (status, body) = request(&app, "GET", "/goals", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let err: ErrorBody = parse(&body);
    assert_eq!(err.message, "Authentication failed: Invalid token");
}

#[tokio::test]
async fn goals_are_owner_scoped() {
    let app = test_app();
    let (alice_token, _) = register_and_login(&app, "alice01", "a@b.com").await;
    let (bob_token, _) = register_and_login(&app, "bob_99", "bob@b.com").await;

    let (status, body) = request(
        &app,
        "POST",
        "/goals",
        Some(&alice_token),
        Some(json!({ "title": "Run 5k" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let goal: Goal = parse(&body);

    // bob cannot see, update, or delete alice's goal
    let uri = format!("/goals/{}", goal.id);
    let (status, _) = request(&app, "GET", &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app,
        "PUT",
        &uri,
        Some(&bob_token),
        Some(json!({ "title": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(&app, "DELETE", &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // bob's own list is empty
    let (status, body) = request(&app, "GET", "/goals", Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let goals: Vec<Goal> = parse(&body);
    assert!(goals.is_empty());
}

#[tokio::test]
async fn create_goal_validates_fields() {
    let app = test_app();
    let (token, _) = register_and_login(&app, "alice01", "a@b.com").await;

    let (status, body) = request(
        &app,
        "POST",
        "/goals",
        Some(&token),
        Some(json!({ "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: ErrorBody = parse(&body);
    assert_eq!(err.message, "Title is required");

    let (status, _) = request(
        &app,
        "POST",
        "/goals",
        Some(&token),
        Some(json!({ "title": "Run 5k", "progress": 150 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
