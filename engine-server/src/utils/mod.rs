//! Utility module
//!
//! Re-exports the unified error types from `shared` plus logging setup.

pub mod logger;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use logger::init_logger;
