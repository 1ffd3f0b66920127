//! Discount engine
//!
//! Two-phase coupon handling: `validate` computes a bounded discount preview
//! without mutating anything; `apply` commits the usage counters after the
//! order row is persisted, without re-validating. The discount amount is
//! locked onto the order at creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::Coupon;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::repository::CouponRepository;

/// Discount preview returned by validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountPreview {
    pub code: String,
    pub discount_amount: f64,
    pub final_amount: f64,
    pub description: Option<String>,
}

pub struct DiscountEngine {
    coupons: CouponRepository,
}

impl DiscountEngine {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            coupons: CouponRepository::new(db),
        }
    }

    /// Validate a coupon against an order context and compute the discount
    ///
    /// Checks short-circuit in order: existence, active flag, validity
    /// window, global usage limit, per-user usage limit, minimum order
    /// amount, allow-list, deny-list.
    pub async fn validate(
        &self,
        code: &str,
        user: &str,
        order_amount: f64,
        product_ids: &[String],
        now: DateTime<Utc>,
    ) -> AppResult<DiscountPreview> {
        let coupon = self
            .coupons
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CouponNotFound))?;

        if !coupon.is_active {
            return Err(AppError::new(ErrorCode::CouponInactive));
        }
        if now < coupon.valid_from {
            return Err(AppError::new(ErrorCode::CouponNotYetValid));
        }
        if now > coupon.valid_until {
            return Err(AppError::new(ErrorCode::CouponExpired));
        }
        if let Some(limit) = coupon.usage_limit
            && coupon.used_count >= limit
        {
            return Err(AppError::new(ErrorCode::CouponUsageLimitReached));
        }
        let user_uses = self.coupons.user_usage_count(&coupon.code, user).await?;
        if user_uses >= coupon.user_usage_limit {
            return Err(AppError::new(ErrorCode::CouponUserLimitReached));
        }
        if order_amount < coupon.min_order_amount {
            return Err(
                AppError::new(ErrorCode::CouponMinAmountNotMet).with_detail(
                    "min_order_amount",
                    coupon.min_order_amount,
                ),
            );
        }
        self.check_applicability(&coupon, product_ids)?;

        let discount_amount = coupon.calculate_discount(order_amount);
        Ok(DiscountPreview {
            code: coupon.code,
            discount_amount,
            final_amount: order_amount - discount_amount,
            description: coupon.description,
        })
    }

    /// Commit a redemption: global counter and per-user ledger, atomically
    pub async fn apply(&self, code: &str, user: &str) -> AppResult<()> {
        self.coupons.apply_usage(code, user).await?;
        Ok(())
    }

    fn check_applicability(&self, coupon: &Coupon, product_ids: &[String]) -> AppResult<()> {
        if !coupon.applicable_products.is_empty() {
            let any_allowed = product_ids
                .iter()
                .any(|p| coupon.applicable_products.contains(p));
            if !any_allowed {
                return Err(AppError::new(ErrorCode::CouponNotApplicable));
            }
        }
        if !coupon.excluded_products.is_empty() {
            let any_excluded = product_ids
                .iter()
                .any(|p| coupon.excluded_products.contains(p));
            if any_excluded {
                return Err(AppError::new(ErrorCode::CouponProductExcluded));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared::models::DiscountType;

    fn coupon_with_lists(allow: Vec<String>, deny: Vec<String>) -> Coupon {
        Coupon {
            id: None,
            code: "SAVE10".into(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: 10.0,
            min_order_amount: 0.0,
            max_discount_amount: None,
            usage_limit: None,
            used_count: 0,
            user_usage_limit: 1,
            valid_from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            valid_until: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            is_active: true,
            applicable_products: allow,
            excluded_products: deny,
            created_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn engine() -> DiscountEngine {
        // check_applicability never touches the repository
        DiscountEngine {
            coupons: CouponRepository::new(Surreal::init()),
        }
    }

    #[test]
    fn test_allow_list_requires_candidate() {
        let engine = engine();
        let coupon = coupon_with_lists(vec!["product:a".into()], vec![]);

        assert!(
            engine
                .check_applicability(&coupon, &["product:a".into(), "product:b".into()])
                .is_ok()
        );
        let err = engine
            .check_applicability(&coupon, &["product:b".into()])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CouponNotApplicable);
    }

    #[test]
    fn test_deny_list_rejects_candidate() {
        let engine = engine();
        let coupon = coupon_with_lists(vec![], vec!["product:x".into()]);

        assert!(engine.check_applicability(&coupon, &["product:a".into()]).is_ok());
        let err = engine
            .check_applicability(&coupon, &["product:a".into(), "product:x".into()])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CouponProductExcluded);
    }

    #[test]
    fn test_empty_lists_apply_to_everything() {
        let engine = engine();
        let coupon = coupon_with_lists(vec![], vec![]);
        assert!(engine.check_applicability(&coupon, &["product:any".into()]).is_ok());
    }
}
