// ============================
// goaltrack-backend-lib/src/router.rs
// ============================
//! HTTP router wiring.
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{self, auth, goals};
use crate::middleware::require_auth;
use crate::store::Store;
use crate::AppState;

/// Create the application router.
///
/// The goal routes are nested behind the authorization gate; the auth
/// and health routes are public.
pub fn create_router<S: Store + 'static>(state: Arc<AppState<S>>) -> Router {
    let goal_routes = Router::new()
        .route("/", post(goals::create_goal::<S>).get(goals::list_goals::<S>))
        .route(
            "/{goal_id}",
            get(goals::get_goal::<S>)
                .put(goals::update_goal::<S>)
                .delete(goals::delete_goal::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<S>,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(auth::register::<S>))
        .route("/auth/login", post(auth::login::<S>))
        .nest("/goals", goal_routes)
        // browser client talks to us cross-origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
