//! Unified error handling
//!
//! Structured error codes grouped by domain category, a single [`AppError`]
//! type carried through every fallible path, and a uniform [`ApiResponse`]
//! envelope for HTTP handlers.
//!
//! # Usage
//!
//! ```rust
//! use shared::error::{AppError, AppResult, ErrorCode};
//!
//! fn lookup(id: &str) -> AppResult<String> {
//!     if id.is_empty() {
//!         return Err(AppError::new(ErrorCode::OrderNotFound));
//!     }
//!     Ok(id.to_string())
//! }
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
