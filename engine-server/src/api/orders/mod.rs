//! Order API
//!
//! Checkout, order state transitions, and credential delivery.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    let user_routes = Router::new()
        .route("/", post(handler::create))
        .route("/my", get(handler::list_my))
        .route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/", get(handler::list_all))
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/payment", put(handler::update_payment))
        .route("/{id}/deliver", put(handler::deliver))
        .layer(middleware::from_fn(require_admin));

    user_routes.merge(manage_routes)
}
