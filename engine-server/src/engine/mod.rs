//! Entitlement lifecycle engine
//!
//! The engine modules carry the business rules: pricing and discounts at
//! checkout, the order state machine, credential provisioning, access-code
//! issuance for shared profiles, and the expiry sweep. Handlers stay thin
//! and delegate here; persistence details live in `db::repository`.

pub mod access;
pub mod discount;
pub mod duration;
pub mod ledger;
pub mod provisioner;
pub mod sweeper;

pub use access::AccessCodeIssuer;
pub use discount::{DiscountEngine, DiscountPreview};
pub use ledger::OrderLedger;
pub use provisioner::{DeliveryOutcome, EntitlementProvisioner};
pub use sweeper::{ExpirySweeper, SweepReport};
