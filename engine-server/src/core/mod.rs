//! Core module: configuration, state, server, and background tasks
//!
//! - [`Config`]: environment-driven server configuration
//! - [`ServerState`]: shared state for handlers and engine services
//! - [`Server`]: HTTP server lifecycle
//! - [`BackgroundTasks`]: registry for long-running tasks

pub mod config;
pub mod error;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
pub use tasks::{BackgroundTasks, TaskKind};
