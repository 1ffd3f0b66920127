//! Shared-profile access code API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/shared-profile", shared_profile_routes())
}

fn shared_profile_routes() -> Router<ServerState> {
    let user_routes = Router::new()
        .route(
            "/subscriptions/{id}/request-code",
            post(handler::request_code),
        )
        .route("/validate/{code}", get(handler::validate_code))
        .route("/my-codes", get(handler::list_my_codes));

    let manage_routes = Router::new()
        .route(
            "/subscriptions/{id}/generate-code",
            post(handler::generate_code),
        )
        .route("/requests", get(handler::list_requests))
        .layer(middleware::from_fn(require_admin));

    user_routes.merge(manage_routes)
}
