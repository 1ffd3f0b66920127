//! Access Code Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access code status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccessCodeStatus {
    Active,
    Used,
    Expired,
}

/// Single-use code granting temporary access to a shared credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessCode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 8-character uppercase alphanumeric token
    pub code: String,
    /// Owning subscription reference
    pub subscription: String,
    /// Requesting user reference
    pub user: String,
    pub status: AccessCodeStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub used_by: Option<String>,
    #[serde(default)]
    pub access_count: u32,
    #[serde(default = "default_max_access")]
    pub max_access: u32,
    pub notes: Option<String>,
}

fn default_max_access() -> u32 {
    1
}

impl AccessCode {
    /// Past deadline, regardless of stored status
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Consumed, either by status or by exhausted access count
    pub fn is_used(&self) -> bool {
        self.status == AccessCodeStatus::Used || self.access_count >= self.max_access
    }
}

/// Credential surface returned on successful validation
///
/// Never carries the raw account password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialView {
    pub email: Option<String>,
    pub profile_name: Option<String>,
    pub pin: Option<String>,
    pub additional_info: Option<String>,
}
