//! API route modules
//!
//! - [`health`]: liveness endpoint
//! - [`products`]: catalog read and operator management
//! - [`orders`]: checkout, order state, delivery
//! - [`coupons`]: discount preview and operator management
//! - [`subscriptions`]: entitlement queries and operator updates
//! - [`shared_profile`]: access codes for shared credentials

pub mod coupons;
pub mod health;
pub mod orders;
pub mod products;
pub mod shared_profile;
pub mod subscriptions;

use axum::{Router, middleware};
use http::HeaderName;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

/// Build the Axum router (without state)
pub fn build_router() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(coupons::router())
        .merge(subscriptions::router())
        .merge(shared_profile::router())
}

/// Build the full application with auth and infrastructure layers
pub fn build_app(state: ServerState) -> Router {
    let request_id = HeaderName::from_static("x-request-id");
    build_router()
        // require_auth skips public routes internally
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}
