//! Entitlement Engine Server
//!
//! Backend for a digital subscription shop: it takes validated orders
//! through payment and fulfillment, provisions entitlements (platform
//! subscriptions with credentials), and gates shared-profile credentials
//! behind single-use access codes.
//!
//! # Module structure
//!
//! ```text
//! engine-server/src/
//! ├── core/      # Config, state, server, background tasks
//! ├── auth/      # JWT validation, role middleware
//! ├── db/        # Embedded SurrealDB and repositories
//! ├── engine/    # Business rules: ledger, discounts, provisioning,
//! │              # access codes, expiry sweep
//! ├── services/  # Outbound notifications
//! ├── api/       # HTTP routes and handlers
//! └── utils/     # Logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod engine;
pub mod services;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use engine::{
    AccessCodeIssuer, DiscountEngine, EntitlementProvisioner, ExpirySweeper, OrderLedger,
};
pub use services::NotifyService;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use utils::logger::{init_logger, init_logger_with_file};
