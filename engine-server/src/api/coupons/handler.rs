//! Coupon API Handlers

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::CouponRepository;
use crate::engine::{DiscountEngine, DiscountPreview};
use shared::error::{AppError, AppResult};
use shared::models::{Coupon, CouponCreate};

#[derive(Deserialize)]
pub struct CouponValidateRequest {
    pub code: String,
    pub order_amount: f64,
    #[serde(default)]
    pub product_ids: Vec<String>,
}

#[derive(Deserialize, Default)]
pub struct CouponListQuery {
    pub active: Option<bool>,
    pub search: Option<String>,
}

/// POST /api/coupons/validate
///
/// Pure preview. Computes the discount without consuming any usage.
pub async fn validate(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CouponValidateRequest>,
) -> AppResult<Json<DiscountPreview>> {
    if payload.code.trim().is_empty() {
        return Err(AppError::validation("Coupon code is required"));
    }
    if payload.order_amount <= 0.0 {
        return Err(AppError::validation("Order amount must be positive"));
    }

    let engine = DiscountEngine::new(state.db.clone());
    let preview = engine
        .validate(
            &payload.code,
            &user.id,
            payload.order_amount,
            &payload.product_ids,
            Utc::now(),
        )
        .await?;
    Ok(Json(preview))
}

/// GET /api/coupons (operator)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<CouponListQuery>,
) -> AppResult<Json<Vec<Coupon>>> {
    let repo = CouponRepository::new(state.db.clone());
    let coupons = repo.find_all(query.active, query.search).await?;
    Ok(Json(coupons))
}

/// POST /api/coupons (operator)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CouponCreate>,
) -> AppResult<Json<Coupon>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    if payload.discount_value <= 0.0 {
        return Err(AppError::validation("Discount value must be positive"));
    }

    let repo = CouponRepository::new(state.db.clone());
    let coupon = repo.create(payload, &user.id).await?;
    Ok(Json(coupon))
}
