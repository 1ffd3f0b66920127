//! Coupon Repository
//!
//! The per-user usage ledger lives in a separate `coupon_usage` table keyed
//! by `[code, user]`, so the global counter and the per-user counter can be
//! bumped in one transaction.

use super::{BaseRepository, RepoError, RepoResult};
use serde::Deserialize;
use shared::models::{Coupon, CouponCreate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Debug, Deserialize)]
struct CouponUsage {
    uses: u32,
}

#[derive(Clone)]
pub struct CouponRepository {
    base: BaseRepository,
}

impl CouponRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find a coupon by its code (codes are stored uppercase)
    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<Coupon>> {
        let code = code.to_uppercase();
        let coupons: Vec<Coupon> = self
            .base
            .db()
            .query("SELECT *, type::string(id) AS id FROM coupon WHERE code = $code LIMIT 1")
            .bind(("code", code))
            .await?
            .take(0)?;
        Ok(coupons.into_iter().next())
    }

    /// List coupons, optionally filtered by active flag and a code substring
    pub async fn find_all(
        &self,
        active: Option<bool>,
        search: Option<String>,
    ) -> RepoResult<Vec<Coupon>> {
        let mut query = String::from("SELECT *, type::string(id) AS id FROM coupon WHERE true");
        if active.is_some() {
            query.push_str(" AND is_active = $active");
        }
        if search.is_some() {
            query.push_str(" AND code CONTAINS $search");
        }
        query.push_str(" ORDER BY created_at DESC");

        let coupons: Vec<Coupon> = self
            .base
            .db()
            .query(query)
            .bind(("active", active.unwrap_or(true)))
            .bind(("search", search.unwrap_or_default().to_uppercase()))
            .await?
            .take(0)?;
        Ok(coupons)
    }

    /// Create a coupon, normalizing the code to uppercase
    pub async fn create(&self, data: CouponCreate, created_by: &str) -> RepoResult<Coupon> {
        let code = data.code.trim().to_uppercase();
        if self.find_by_code(&code).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Coupon '{}' already exists",
                code
            )));
        }

        let now = chrono::Utc::now();
        let coupon = Coupon {
            id: None,
            code,
            description: data.description,
            discount_type: data.discount_type,
            discount_value: data.discount_value,
            min_order_amount: data.min_order_amount.unwrap_or(0.0),
            max_discount_amount: data.max_discount_amount,
            usage_limit: data.usage_limit,
            used_count: 0,
            user_usage_limit: data.user_usage_limit.unwrap_or(1),
            valid_from: data.valid_from,
            valid_until: data.valid_until,
            is_active: data.is_active.unwrap_or(true),
            applicable_products: data.applicable_products.unwrap_or_default(),
            excluded_products: data.excluded_products.unwrap_or_default(),
            created_by: Some(created_by.to_string()),
            created_at: Some(now),
            updated_at: Some(now),
        };

        let mut result = self
            .base
            .db()
            .query(
                "LET $created = CREATE ONLY coupon CONTENT $data;
                 SELECT *, type::string(id) AS id FROM $created.id;",
            )
            .bind(("data", coupon))
            .await?;
        let created: Vec<Coupon> = result.take(1)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create coupon".to_string()))
    }

    /// How many times a user has redeemed a coupon
    pub async fn user_usage_count(&self, code: &str, user: &str) -> RepoResult<u32> {
        let code = code.to_uppercase();
        let usage: Vec<CouponUsage> = self
            .base
            .db()
            .query("SELECT uses FROM type::thing(\"coupon_usage\", [$code, $user])")
            .bind(("code", code))
            .bind(("user", user.to_string()))
            .await?
            .take(0)?;
        Ok(usage.into_iter().next().map(|u| u.uses).unwrap_or(0))
    }

    /// Commit one redemption: bump the global counter and the per-user
    /// ledger in a single transaction
    pub async fn apply_usage(&self, code: &str, user: &str) -> RepoResult<()> {
        let code = code.to_uppercase();
        self.base
            .db()
            .query(
                "BEGIN TRANSACTION;
                 UPDATE coupon SET used_count += 1, updated_at = $now WHERE code = $code;
                 UPSERT type::thing(\"coupon_usage\", [$code, $user])
                     SET uses += 1, coupon = $code, user = $user;
                 COMMIT TRANSACTION;",
            )
            .bind(("code", code))
            .bind(("user", user.to_string()))
            .bind(("now", chrono::Utc::now()))
            .await?
            .check()?;
        Ok(())
    }
}
