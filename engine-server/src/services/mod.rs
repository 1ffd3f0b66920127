//! Service modules
//!
//! Outbound collaborator boundaries: the notifier and its templates.

pub mod notify;
pub mod templates;

pub use notify::{HttpNotifier, NoopNotifier, Notifier, NotifyError, NotifyService};
