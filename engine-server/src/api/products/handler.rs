//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::ProductRepository;
use shared::error::{AppError, AppResult};
use shared::models::{Product, ProductCreate};

#[derive(Deserialize, Default)]
pub struct ProductQuery {
    /// When true, inactive products are included (operator views)
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/products
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_all(!query.include_inactive).await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;
    Ok(Json(product))
}

/// POST /api/products (operator)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Product name is required"));
    }
    if payload.profile_tiers.is_empty() {
        return Err(AppError::validation("At least one profile tier is required"));
    }

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(payload).await?;
    Ok(Json(product))
}
