pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod session;
pub mod state;
pub mod store;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the full application router.
///
/// The permissive CORS layer answers OPTIONS preflights and stamps every
/// response with cross-origin headers; unknown routes and known routes hit
/// with the wrong method get JSON error bodies.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Auth
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/verify", get(handlers::auth::verify))
        // Apartments: reads public, mutations session-gated in the handlers
        .route("/apartments", get(handlers::apartments::list).post(handlers::apartments::create))
        .route(
            "/apartments/:id",
            get(handlers::apartments::get)
                .put(handlers::apartments::update)
                .delete(handlers::apartments::delete),
        )
        // Tenants
        .route("/tenants", get(handlers::tenants::list).post(handlers::tenants::create))
        .route(
            "/tenants/:id",
            get(handlers::tenants::get)
                .put(handlers::tenants::update)
                .delete(handlers::tenants::delete),
        )
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
