//! Shared types for the entitlement engine
//!
//! Common types used across crates: domain models, error types and the
//! unified API response structure.

pub mod error;
pub mod models;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
