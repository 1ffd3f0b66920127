//! Access Code Repository
//!
//! The unique index on `access_code.code` and the issue transaction are the
//! authoritative guards; concurrent issuance or validation for one code
//! resolves to exactly one winner at the storage layer.

use super::{BaseRepository, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use shared::models::AccessCode;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const DUPLICATE_ACTIVE: &str = "duplicate_active_code";

#[derive(Clone)]
pub struct AccessCodeRepository {
    base: BaseRepository,
}

impl AccessCodeRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a new active code
    ///
    /// Runs in a transaction that throws when an active, unexpired code
    /// already exists for the (subscription, user) pair, so concurrent
    /// issuance yields one winner.
    pub async fn create_active(&self, code: AccessCode) -> RepoResult<AccessCode> {
        let code_str = code.code.clone();
        let mut response = self
            .base
            .db()
            .query(
                "BEGIN TRANSACTION;
                 LET $existing = SELECT VALUE id FROM access_code
                     WHERE subscription = $subscription AND user = $user
                       AND status = 'active' AND expires_at >= $now;
                 IF array::len($existing) > 0 { THROW 'duplicate_active_code' };
                 CREATE access_code CONTENT $data;
                 COMMIT TRANSACTION;",
            )
            .bind(("subscription", code.subscription.clone()))
            .bind(("user", code.user.clone()))
            .bind(("now", code.created_at))
            .bind(("data", code))
            .await?;

        // A failed transaction reports errors on every statement; the THROW
        // marker only appears on the statement that raised it.
        let errors = response.take_errors();
        if !errors.is_empty() {
            if errors
                .values()
                .any(|e| e.to_string().contains(DUPLICATE_ACTIVE))
            {
                return Err(RepoError::Duplicate(
                    "An active code already exists for this subscription".to_string(),
                ));
            }
            let mut messages: Vec<String> =
                errors.into_values().map(|e| e.to_string()).collect();
            messages.sort();
            messages.dedup();
            return Err(RepoError::Database(messages.join("; ")));
        }

        self.find_by_code(&code_str)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create access code".to_string()))
    }

    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<AccessCode>> {
        let codes: Vec<AccessCode> = self
            .base
            .db()
            .query("SELECT *, type::string(id) AS id FROM access_code WHERE code = $code LIMIT 1")
            .bind(("code", code.to_string()))
            .await?
            .take(0)?;
        Ok(codes.into_iter().next())
    }

    pub async fn find_by_user(&self, user: &str) -> RepoResult<Vec<AccessCode>> {
        let codes: Vec<AccessCode> = self
            .base
            .db()
            .query(
                "SELECT *, type::string(id) AS id FROM access_code
                 WHERE user = $user ORDER BY created_at DESC",
            )
            .bind(("user", user.to_string()))
            .await?
            .take(0)?;
        Ok(codes)
    }

    /// Lazily flip an overdue active code to expired
    ///
    /// Conditional update; a no-op when the code is already used or expired.
    /// Returns true when this call performed the flip.
    pub async fn expire_if_overdue(&self, code: &str, now: DateTime<Utc>) -> RepoResult<bool> {
        let updated: Vec<String> = self
            .base
            .db()
            .query(
                "UPDATE access_code SET status = 'expired'
                 WHERE code = $code AND status = 'active' AND expires_at < $now
                 RETURN VALUE type::string(id)",
            )
            .bind(("code", code.to_string()))
            .bind(("now", now))
            .await?
            .take(0)?;
        Ok(!updated.is_empty())
    }

    /// Atomically consume a code: active -> used, record consumer, bump the
    /// access count. Only one concurrent caller can win this update.
    pub async fn consume(
        &self,
        code: &str,
        user: Option<&str>,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<AccessCode>> {
        let winners: Vec<String> = self
            .base
            .db()
            .query(
                "UPDATE access_code
                 SET status = 'used', used_at = $now, used_by = $user, access_count += 1
                 WHERE code = $code AND status = 'active'
                   AND expires_at >= $now AND access_count < max_access
                 RETURN VALUE type::string(id)",
            )
            .bind(("code", code.to_string()))
            .bind(("user", user.map(|u| u.to_string())))
            .bind(("now", now))
            .await?
            .take(0)?;

        if winners.is_empty() {
            return Ok(None);
        }
        self.find_by_code(code).await
    }
}
