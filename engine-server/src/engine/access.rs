//! Access code issuer
//!
//! Issues and validates single-use, time-boxed codes gating a shared
//! credential. The code itself is the delivery payload; it is never
//! re-derivable once lost, forcing a fresh issue.

use chrono::{Duration, Utc};
use rand::Rng;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    AccessCode, AccessCodeStatus, AccessRequest, CredentialView, Subscription,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::repository::{AccessCodeRepository, RepoError, SubscriptionRepository};
use crate::services::{NotifyService, templates};

const CODE_LEN: usize = 8;
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate an 8-character uppercase alphanumeric code
///
/// No uniqueness retry loop: collisions are negligible at this key space,
/// and the unique index on `access_code.code` is the authoritative guard.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

pub struct AccessCodeIssuer {
    codes: AccessCodeRepository,
    subscriptions: SubscriptionRepository,
    notify: NotifyService,
    ttl_hours: i64,
}

impl AccessCodeIssuer {
    pub fn new(db: Surreal<Db>, notify: NotifyService, ttl_hours: i64) -> Self {
        Self {
            codes: AccessCodeRepository::new(db.clone()),
            subscriptions: SubscriptionRepository::new(db),
            notify,
            ttl_hours,
        }
    }

    /// Issue a code for a shared-profile subscription
    ///
    /// Fails when the subscription's credentials are not flagged shared, or
    /// when an active unexpired code already exists for this
    /// (subscription, user) pair. The code is emailed in cleartext.
    pub async fn issue(
        &self,
        subscription_id: &str,
        user_id: Option<&str>,
        user_email: Option<&str>,
        notes: Option<String>,
    ) -> AppResult<AccessCode> {
        let subscription = self.get_subscription(subscription_id).await?;
        if !subscription.credentials.is_shared_profile {
            return Err(AppError::new(ErrorCode::SubscriptionNotShared));
        }

        let user = user_id.unwrap_or(&subscription.user);
        let now = Utc::now();
        let code = AccessCode {
            id: None,
            code: generate_code(),
            subscription: subscription.id.clone().unwrap_or_default(),
            user: user.to_string(),
            status: AccessCodeStatus::Active,
            created_at: now,
            expires_at: now + Duration::hours(self.ttl_hours),
            used_at: None,
            used_by: None,
            access_count: 0,
            max_access: 1,
            notes,
        };

        let created = match self.codes.create_active(code).await {
            Ok(created) => created,
            Err(RepoError::Duplicate(msg)) => {
                return Err(AppError::with_message(ErrorCode::DuplicateActiveCode, msg));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(email) = user_email {
            let (subject, body) = templates::access_code_issued(&created.code, self.ttl_hours);
            self.notify.dispatch(email, subject, body);
        }

        Ok(created)
    }

    /// Record a pending access request and alert the operator
    ///
    /// Issuance stays a separate operator action.
    pub async fn request_access(
        &self,
        subscription_id: &str,
        user_id: &str,
    ) -> AppResult<Subscription> {
        let subscription = self.get_subscription(subscription_id).await?;
        if !subscription.credentials.is_shared_profile {
            return Err(AppError::new(ErrorCode::SubscriptionNotShared));
        }
        if subscription.user != user_id {
            return Err(AppError::forbidden("Not your subscription"));
        }

        let request = AccessRequest {
            user: user_id.to_string(),
            requested_at: Utc::now(),
        };
        let updated = self
            .subscriptions
            .append_access_request(subscription_id, request)
            .await?;

        let (subject, body) = templates::access_request_alert(&updated, user_id);
        self.notify.dispatch_operator(subject, body);

        Ok(updated)
    }

    /// Validate and consume a code, returning the credential view
    ///
    /// Lazy expiry runs first: an overdue active code is flipped to expired
    /// before anything else, so a code past its deadline behaves identically
    /// whether the sweeper saw it or not. The active -> used flip is a
    /// storage-layer conditional update; concurrent validators get exactly
    /// one winner.
    pub async fn validate(&self, code: &str, user_id: Option<&str>) -> AppResult<CredentialView> {
        let now = Utc::now();
        self.codes.expire_if_overdue(code, now).await?;

        match self.codes.consume(code, user_id, now).await? {
            Some(consumed) => {
                let subscription = self.get_subscription(&consumed.subscription).await?;
                let credentials = &subscription.credentials;
                Ok(CredentialView {
                    email: credentials.email.clone(),
                    profile_name: credentials.profile_name.clone(),
                    pin: credentials.pin.clone(),
                    additional_info: credentials.additional_info.clone(),
                })
            }
            None => {
                // Distinguish a consumed code from an unknown/expired one
                match self.codes.find_by_code(code).await? {
                    Some(existing) if existing.status == AccessCodeStatus::Used => {
                        Err(AppError::new(ErrorCode::AccessCodeAlreadyUsed))
                    }
                    _ => Err(AppError::new(ErrorCode::AccessCodeNotFound)),
                }
            }
        }
    }

    /// All codes a user has requested, newest first
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<AccessCode>> {
        Ok(self.codes.find_by_user(user_id).await?)
    }

    /// Subscriptions with pending requests (operator view)
    pub async fn list_pending_requests(&self) -> AppResult<Vec<Subscription>> {
        Ok(self.subscriptions.find_with_pending_requests().await?)
    }

    async fn get_subscription(&self, id: &str) -> AppResult<Subscription> {
        self.subscriptions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::SubscriptionNotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 8);
            assert!(code.bytes().all(|b| CHARSET.contains(&b)));
        }
    }

    #[test]
    fn test_generated_codes_vary() {
        let a = generate_code();
        let b = generate_code();
        let c = generate_code();
        assert!(a != b || b != c);
    }
}
