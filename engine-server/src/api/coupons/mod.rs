//! Coupon API
//!
//! Discount preview for checkout plus operator management.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/coupons", coupon_routes())
}

fn coupon_routes() -> Router<ServerState> {
    let user_routes = Router::new().route("/validate", post(handler::validate));

    let manage_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .layer(middleware::from_fn(require_admin));

    user_routes.merge(manage_routes)
}
