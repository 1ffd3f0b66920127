//! Order API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::engine::{DeliveryOutcome, EntitlementProvisioner, OrderLedger};
use shared::error::AppResult;
use shared::models::{
    CredentialBundle, FulfillmentStatus, Order, OrderCreate, PaymentResult, PaymentStatus,
};

#[derive(Deserialize, Default)]
pub struct OrderListQuery {
    pub status: Option<FulfillmentStatus>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: FulfillmentStatus,
    pub admin_notes: Option<String>,
}

#[derive(Deserialize)]
pub struct PaymentUpdateRequest {
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub raw_status: Option<String>,
}

#[derive(Deserialize)]
pub struct DeliverRequest {
    pub credentials: CredentialBundle,
    pub activation_key: Option<String>,
    pub instructions: Option<String>,
    /// Subscription start override, defaults to now
    pub start_date: Option<DateTime<Utc>>,
}

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    payload
        .validate()
        .map_err(|e| shared::error::AppError::validation(e.to_string()))?;

    let ledger = OrderLedger::new(state.db.clone(), state.notify.clone());
    let order = ledger.create(&user.id, &user.email, payload).await?;
    Ok(Json(order))
}

/// GET /api/orders/my
pub async fn list_my(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Order>>> {
    let ledger = OrderLedger::new(state.db.clone(), state.notify.clone());
    let orders = ledger.list_for_user(&user.id).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let ledger = OrderLedger::new(state.db.clone(), state.notify.clone());
    let order = ledger.get_checked(&id, &user.id, user.is_admin()).await?;
    Ok(Json(order))
}

/// GET /api/orders (operator)
pub async fn list_all(
    State(state): State<ServerState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let ledger = OrderLedger::new(state.db.clone(), state.notify.clone());
    let orders = ledger.list_all(query.status, query.payment_status).await?;
    Ok(Json(orders))
}

/// PUT /api/orders/{id}/status (operator)
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> AppResult<Json<Order>> {
    let ledger = OrderLedger::new(state.db.clone(), state.notify.clone());
    let order = ledger
        .set_fulfillment_status(&id, payload.status, payload.admin_notes)
        .await?;
    Ok(Json(order))
}

/// PUT /api/orders/{id}/payment (operator or gateway callback)
pub async fn update_payment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PaymentUpdateRequest>,
) -> AppResult<Json<Order>> {
    // Manual operator completion gets a synthesized transaction id
    let gateway_result = if payload.transaction_id.is_some() || payload.status == PaymentStatus::Completed {
        Some(PaymentResult {
            transaction_id: Some(
                payload
                    .transaction_id
                    .clone()
                    .unwrap_or_else(|| format!("manual::{}", uuid::Uuid::new_v4())),
            ),
            raw_status: payload.raw_status.clone(),
        })
    } else {
        None
    };
    let ledger = OrderLedger::new(state.db.clone(), state.notify.clone());
    let order = ledger
        .set_payment_status(&id, payload.status, gateway_result)
        .await?;
    Ok(Json(order))
}

/// PUT /api/orders/{id}/deliver (operator)
pub async fn deliver(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DeliverRequest>,
) -> AppResult<Json<DeliveryOutcome>> {
    let provisioner = EntitlementProvisioner::new(state.db.clone(), state.notify.clone());
    let outcome = provisioner
        .deliver(
            &id,
            payload.credentials,
            payload.activation_key,
            payload.instructions,
            payload.start_date,
        )
        .await?;
    Ok(Json(outcome))
}
