//! Subscription API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::SubscriptionRepository;
use shared::error::{AppError, AppResult};
use shared::models::{Subscription, SubscriptionUpdate};

/// Subscription plus derived lifecycle fields
///
/// Expiry on read paths is derived, never written back; the sweeper is the
/// only writer of the persisted `expired` status.
#[derive(Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub days_remaining: i64,
    pub is_expired: bool,
}

impl SubscriptionView {
    fn derive(subscription: Subscription) -> Self {
        let now = Utc::now();
        let days_remaining = subscription.days_remaining(now);
        let is_expired = subscription.is_expired(now);
        Self {
            subscription,
            days_remaining,
            is_expired,
        }
    }
}

/// GET /api/subscriptions/my
pub async fn list_my(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<SubscriptionView>>> {
    let repo = SubscriptionRepository::new(state.db.clone());
    let subscriptions = repo.find_by_user(&user.id).await?;
    Ok(Json(
        subscriptions
            .into_iter()
            .map(SubscriptionView::derive)
            .collect(),
    ))
}

/// GET /api/subscriptions/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<SubscriptionView>> {
    let subscription = find_checked(&state, &id, &user).await?;
    Ok(Json(SubscriptionView::derive(subscription)))
}

/// PUT /api/subscriptions/{id} (operator)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<SubscriptionUpdate>,
) -> AppResult<Json<SubscriptionView>> {
    let repo = SubscriptionRepository::new(state.db.clone());
    let subscription = repo.update(&id, payload).await?;
    Ok(Json(SubscriptionView::derive(subscription)))
}

/// PUT /api/subscriptions/{id}/cancel (owner or operator)
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<SubscriptionView>> {
    find_checked(&state, &id, &user).await?;
    let repo = SubscriptionRepository::new(state.db.clone());
    let subscription = repo.cancel(&id).await?;
    tracing::info!(subscription = %id, user = %user.id, "Subscription cancelled");
    Ok(Json(SubscriptionView::derive(subscription)))
}

async fn find_checked(
    state: &ServerState,
    id: &str,
    user: &CurrentUser,
) -> AppResult<Subscription> {
    let repo = SubscriptionRepository::new(state.db.clone());
    let subscription = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Subscription {}", id)))?;
    if !user.is_admin() && subscription.user != user.id {
        return Err(AppError::forbidden("Not your subscription"));
    }
    Ok(subscription)
}
