//! Subscription API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/subscriptions", subscription_routes())
}

fn subscription_routes() -> Router<ServerState> {
    let user_routes = Router::new()
        .route("/my", get(handler::list_my))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", put(handler::cancel));

    let manage_routes = Router::new()
        .route("/{id}", put(handler::update))
        .layer(middleware::from_fn(require_admin));

    user_routes.merge(manage_routes)
}
