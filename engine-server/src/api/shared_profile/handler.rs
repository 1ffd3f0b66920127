//! Shared-profile API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::engine::AccessCodeIssuer;
use shared::error::AppResult;
use shared::models::{AccessCode, CredentialView, Subscription};

#[derive(Deserialize, Default)]
pub struct GenerateCodeRequest {
    /// Target user, defaults to the subscription owner
    pub user_id: Option<String>,
    /// Contact address for the cleartext code notification
    pub user_email: Option<String>,
    pub notes: Option<String>,
}

fn issuer(state: &ServerState) -> AccessCodeIssuer {
    AccessCodeIssuer::new(
        state.db.clone(),
        state.notify.clone(),
        state.config.access_code_ttl_hours,
    )
}

/// POST /api/shared-profile/subscriptions/{id}/request-code
pub async fn request_code(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Subscription>> {
    let subscription = issuer(&state).request_access(&id, &user.id).await?;
    Ok(Json(subscription))
}

/// POST /api/shared-profile/subscriptions/{id}/generate-code (operator)
pub async fn generate_code(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<GenerateCodeRequest>,
) -> AppResult<Json<AccessCode>> {
    let code = issuer(&state)
        .issue(
            &id,
            payload.user_id.as_deref(),
            payload.user_email.as_deref(),
            payload.notes,
        )
        .await?;
    Ok(Json(code))
}

/// GET /api/shared-profile/validate/{code}
pub async fn validate_code(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(code): Path<String>,
) -> AppResult<Json<CredentialView>> {
    let view = issuer(&state).validate(&code, Some(&user.id)).await?;
    Ok(Json(view))
}

/// GET /api/shared-profile/my-codes
pub async fn list_my_codes(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<AccessCode>>> {
    let codes = issuer(&state).list_for_user(&user.id).await?;
    Ok(Json(codes))
}

/// GET /api/shared-profile/requests (operator)
pub async fn list_requests(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<Subscription>>> {
    let subscriptions = issuer(&state).list_pending_requests().await?;
    Ok(Json(subscriptions))
}
