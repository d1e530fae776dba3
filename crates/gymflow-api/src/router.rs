//! Route definitions for the GymFlow HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::routing::{delete, get, patch, post};
use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(session_routes())
        .merge(reservation_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Session CRUD and per-session reservation listing
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(handlers::session::create_session))
        .route("/sessions", get(handlers::session::list_sessions))
        .route("/sessions/{id}", get(handlers::session::get_session))
        .route("/sessions/{id}", patch(handlers::session::update_session))
        .route("/sessions/{id}", delete(handlers::session::delete_session))
        .route(
            "/sessions/{id}/reservations",
            get(handlers::reservation::list_session_reservations),
        )
}

/// Reservation lifecycle and per-user listing
fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reservations",
            post(handlers::reservation::create_reservation),
        )
        .route(
            "/reservations/{id}",
            get(handlers::reservation::get_reservation),
        )
        .route(
            "/reservations/{id}",
            delete(handlers::reservation::cancel_reservation),
        )
        .route(
            "/users/{user_id}/reservations",
            get(handlers::reservation::list_user_reservations),
        )
}

/// Health endpoints
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
