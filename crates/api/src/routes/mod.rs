//! API routes

pub mod auth;
pub mod health;
pub mod projects;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_cookies::CookieManagerLayer;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{auth::require_auth, state::AppState};

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    let auth_state = state.auth_state();

    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Public API routes (no auth required) - under /api/v1
    let public_api_routes = Router::new()
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/refresh", post(auth::refresh));

    // Protected API routes (auth required) - under /api/v1
    let protected_api_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/projects",
            post(projects::create_project).get(projects::list_projects),
        )
        .route(
            "/projects/:id",
            get(projects::get_project)
                .patch(projects::update_project)
                .delete(projects::delete_project),
        )
        .layer(middleware::from_fn_with_state(auth_state, require_auth));

    let api_v1_routes = Router::new()
        .merge(public_api_routes)
        .merge(protected_api_routes);

    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", api_v1_routes)
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
