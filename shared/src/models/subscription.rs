//! Subscription Model

use super::duration::DurationSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
    Suspended,
}

/// Account credentials delivered with a subscription
///
/// For shared-profile tiers the password stays server-side; consumers only
/// ever see the [`crate::models::CredentialView`] surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialBundle {
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_name: Option<String>,
    pub pin: Option<String>,
    #[serde(default)]
    pub is_shared_profile: bool,
    pub additional_info: Option<String>,
}

/// A pending access-code (or sign-in-code) request on a subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    pub user: String,
    pub requested_at: DateTime<Utc>,
}

/// Subscription entity, one per delivered order line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Owning user reference
    pub user: String,
    /// Originating order reference
    pub order_id: String,
    /// Product reference
    pub product: String,
    pub product_name: Option<String>,
    pub platform_type: String,
    pub tier_name: String,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub duration: DurationSpec,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub credentials: CredentialBundle,
    pub activation_key: Option<String>,
    #[serde(default)]
    pub auto_renew: bool,
    pub notes: Option<String>,
    #[serde(default)]
    pub access_code_requests: Vec<AccessRequest>,
    #[serde(default)]
    pub signin_code_requests: Vec<AccessRequest>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Lazy expiry check, derived from the clock rather than stored status
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Expired || now > self.expiry_date
    }

    /// Days until expiry, rounded up; a partial day still counts. Never
    /// negative.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        let secs = (self.expiry_date - now).num_seconds();
        if secs <= 0 { 0 } else { (secs as u64).div_ceil(86_400) as i64 }
    }
}

/// Operator update payload
///
/// Unset fields are omitted from serialization so merge updates leave them
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CredentialBundle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
