//! Subscription Repository

use super::{BaseRepository, RepoError, RepoResult, strip_table_prefix};
use chrono::{DateTime, Utc};
use shared::models::{AccessRequest, CredentialBundle, Subscription, SubscriptionUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "subscription";

#[derive(Clone)]
pub struct SubscriptionRepository {
    base: BaseRepository,
}

impl SubscriptionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, subscription: Subscription) -> RepoResult<Subscription> {
        let mut result = self
            .base
            .db()
            .query(
                "LET $created = CREATE ONLY subscription CONTENT $data;
                 SELECT *, type::string(id) AS id FROM $created.id;",
            )
            .bind(("data", subscription))
            .await?;
        let created: Vec<Subscription> = result.take(1)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create subscription".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Subscription>> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let subs: Vec<Subscription> = self
            .base
            .db()
            .query("SELECT *, type::string(id) AS id FROM type::thing($table, $id)")
            .bind(("table", TABLE))
            .bind(("id", pure_id))
            .await?
            .take(0)?;
        Ok(subs.into_iter().next())
    }

    pub async fn find_by_user(&self, user: &str) -> RepoResult<Vec<Subscription>> {
        let subs: Vec<Subscription> = self
            .base
            .db()
            .query(
                "SELECT *, type::string(id) AS id FROM subscription
                 WHERE user = $user ORDER BY created_at DESC",
            )
            .bind(("user", user.to_string()))
            .await?
            .take(0)?;
        Ok(subs)
    }

    /// Subscriptions provisioned from one order
    pub async fn find_by_order(&self, order: &str) -> RepoResult<Vec<Subscription>> {
        let subs: Vec<Subscription> = self
            .base
            .db()
            .query("SELECT *, type::string(id) AS id FROM subscription WHERE order_id = $order_id")
            .bind(("order_id", order.to_string()))
            .await?
            .take(0)?;
        Ok(subs)
    }

    /// Overwrite credentials and activation key in place (re-delivery path)
    pub async fn update_credentials(
        &self,
        id: &str,
        credentials: CredentialBundle,
        activation_key: Option<String>,
    ) -> RepoResult<Subscription> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing($table, $id)
                 SET credentials = $credentials, activation_key = $key, updated_at = $now;
                 SELECT *, type::string(id) AS id FROM type::thing($table, $id);",
            )
            .bind(("table", TABLE))
            .bind(("id", pure_id))
            .bind(("credentials", credentials))
            .bind(("key", activation_key))
            .bind(("now", Utc::now()))
            .await?;
        let subs: Vec<Subscription> = result.take(1)?;
        subs.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Subscription {} not found", id)))
    }

    /// Operator merge update
    pub async fn update(&self, id: &str, data: SubscriptionUpdate) -> RepoResult<Subscription> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        if self.find_by_id(&pure_id).await?.is_none() {
            return Err(RepoError::NotFound(format!("Subscription {} not found", id)));
        }
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing($table, $id) MERGE $data;
                 UPDATE type::thing($table, $id) SET updated_at = $now;
                 SELECT *, type::string(id) AS id FROM type::thing($table, $id);",
            )
            .bind(("table", TABLE))
            .bind(("id", pure_id))
            .bind(("data", data))
            .bind(("now", Utc::now()))
            .await?;
        let subs: Vec<Subscription> = result.take(2)?;
        subs.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Subscription {} not found", id)))
    }

    /// Flip a subscription to cancelled, whatever its current status
    pub async fn cancel(&self, id: &str) -> RepoResult<Subscription> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing($table, $id)
                 SET status = 'cancelled', updated_at = $now;
                 SELECT *, type::string(id) AS id FROM type::thing($table, $id);",
            )
            .bind(("table", TABLE))
            .bind(("id", pure_id))
            .bind(("now", Utc::now()))
            .await?;
        let subs: Vec<Subscription> = result.take(1)?;
        subs.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Subscription {} not found", id)))
    }

    /// Bulk transition every overdue active subscription to expired,
    /// returning the expired rows
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> RepoResult<Vec<Subscription>> {
        let expired: Vec<Subscription> = self
            .base
            .db()
            .query(
                "LET $overdue = UPDATE subscription
                     SET status = 'expired', updated_at = $now
                     WHERE status = 'active' AND expiry_date < $now
                     RETURN VALUE type::string(id);
                 SELECT *, type::string(id) AS id FROM subscription
                     WHERE type::string(id) IN $overdue;",
            )
            .bind(("now", now))
            .await?
            .take(1)?;
        Ok(expired)
    }

    /// Active subscriptions whose expiry falls inside the warning window
    pub async fn find_expiring_within(
        &self,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> RepoResult<Vec<Subscription>> {
        let subs: Vec<Subscription> = self
            .base
            .db()
            .query(
                "SELECT *, type::string(id) AS id FROM subscription
                 WHERE status = 'active' AND expiry_date >= $now AND expiry_date <= $until",
            )
            .bind(("now", now))
            .bind(("until", until))
            .await?
            .take(0)?;
        Ok(subs)
    }

    /// Append a pending access-code request
    pub async fn append_access_request(
        &self,
        id: &str,
        request: AccessRequest,
    ) -> RepoResult<Subscription> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing($table, $id)
                 SET access_code_requests += $request, updated_at = $now;
                 SELECT *, type::string(id) AS id FROM type::thing($table, $id);",
            )
            .bind(("table", TABLE))
            .bind(("id", pure_id))
            .bind(("request", request))
            .bind(("now", Utc::now()))
            .await?;
        let subs: Vec<Subscription> = result.take(1)?;
        subs.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Subscription {} not found", id)))
    }

    /// Subscriptions that have at least one pending request (operator view)
    pub async fn find_with_pending_requests(&self) -> RepoResult<Vec<Subscription>> {
        let subs: Vec<Subscription> = self
            .base
            .db()
            .query(
                "SELECT *, type::string(id) AS id FROM subscription
                 WHERE array::len(access_code_requests) > 0",
            )
            .await?
            .take(0)?;
        Ok(subs)
    }
}
