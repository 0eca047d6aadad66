use super::*;
use crate::auth::token::{TokenService, DEFAULT_TTL_SECS};
use crate::config::Settings;
use crate::store::MemoryStore;
use axum::{
    body::Body,
    http::{Request as HttpRequest, StatusCode},
    routing::get,
    Extension, Router,
};
use goaltrack_common::ErrorBody;
use tower::ServiceExt;

async fn whoami(Extension(ctx): Extension<AuthContext>) -> String {
    ctx.email
}

fn test_state() -> Arc<AppState<MemoryStore>> {
    let settings = Settings {
        jwt_secret: "test-secret".to_string(),
        ..Settings::default()
    };
    Arc::new(AppState::new(MemoryStore::new(), settings))
}

fn gated_app(state: Arc<AppState<MemoryStore>>) -> Router {
    Router::new()
        .route("/protected", get(whoami))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth::<MemoryStore>,
        ))
        .with_state(state)
}

async fn send(app: &Router, auth_header: Option<&str>) -> (StatusCode, String) {
    let mut builder = HttpRequest::builder().uri("/protected");
    if let Some(value) = auth_header {
        builder = builder.header("Authorization", value);
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn error_message(app: &Router, auth_header: Option<&str>) -> String {
    let (status, body) = send(app, auth_header).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let body: ErrorBody = serde_json::from_str(&body).unwrap();
    body.message
}

#[tokio::test]
async fn test_missing_header_rejected() {
    let app = gated_app(test_state());
    assert_eq!(
        error_message(&app, None).await,
        "Authentication failed: No token provided"
    );
}

#[tokio::test]
async fn test_malformed_header_rejected() {
    let app = gated_app(test_state());

    assert_eq!(
        error_message(&app, Some("Basic abc123")).await,
        "Authentication failed: Invalid token format"
    );
    assert_eq!(
        error_message(&app, Some("Bearer too many parts")).await,
        "Authentication failed: Invalid token format"
    );
    assert_eq!(
        error_message(&app, Some("Bearer ")).await,
        "Authentication failed: Token is empty"
    );
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let app = gated_app(test_state());
    assert_eq!(
        error_message(&app, Some("Bearer not.a.jwt")).await,
        "Authentication failed: Invalid token"
    );
}

#[tokio::test]
async fn test_token_without_subject_rejected() {
    #[derive(serde::Serialize)]
    struct NoSub {
        email: String,
        iat: i64,
        exp: i64,
    }

    let app = gated_app(test_state());

    // signed with the right secret, but carries no `sub` claim
    let now = chrono::Utc::now().timestamp();
    let claims = NoSub {
        email: "a@b.com".to_string(),
        iat: now,
        exp: now + 3600,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap();

    assert_eq!(
        error_message(&app, Some(&format!("Bearer {token}"))).await,
        "Authentication failed: Invalid token payload"
    );
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let state = test_state();
    let app = gated_app(state.clone());

    let zero_ttl = TokenService::new("test-secret", 0);
    let user = state
        .auth
        .register("alice01", "a@b.com", "longpass1")
        .await
        .unwrap();
    let token = zero_ttl.issue(user.id, &user.email).unwrap();

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    assert_eq!(
        error_message(&app, Some(&format!("Bearer {token}"))).await,
        "Authentication failed: Token expired"
    );
}

#[tokio::test]
async fn test_unresolvable_identity_rejected() {
    let state = test_state();
    let app = gated_app(state.clone());

    // valid signature, but no such record in the store
    let tokens = TokenService::new("test-secret", DEFAULT_TTL_SECS);
    let token = tokens.issue(uuid::Uuid::new_v4(), "ghost@b.com").unwrap();

    assert_eq!(
        error_message(&app, Some(&format!("Bearer {token}"))).await,
        "Authentication failed: User not found"
    );
}

#[tokio::test]
async fn test_valid_token_attaches_identity() {
    let state = test_state();
    let app = gated_app(state.clone());

    state
        .auth
        .register("alice01", "a@b.com", "longpass1")
        .await
        .unwrap();
    let (token, _) = state.auth.login("a@b.com", "longpass1").await.unwrap();

    let (status, body) = send(&app, Some(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "a@b.com");
}
