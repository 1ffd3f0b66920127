//! Coupon Model

use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Discount type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// Coupon entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Coupon code, stored uppercase
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    #[serde(default)]
    pub min_order_amount: f64,
    /// Cap on the computed discount (percentage type only)
    pub max_discount_amount: Option<f64>,
    /// Global redemption limit (None = unbounded)
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    /// Per-user redemption limit
    #[serde(default = "default_user_limit")]
    pub user_usage_limit: u32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
    /// Allow-list of applicable product IDs (empty = all products)
    #[serde(default)]
    pub applicable_products: Vec<String>,
    /// Deny-list of excluded product IDs
    #[serde(default)]
    pub excluded_products: Vec<String>,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_user_limit() -> u32 {
    1
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

impl Coupon {
    /// Compute the discount for an order amount
    ///
    /// Percentage discounts are clamped to `max_discount_amount` when set;
    /// fixed discounts never exceed the order amount. The result is in
    /// `[0, order_amount]`, rounded half-up to 2 decimal places.
    pub fn calculate_discount(&self, order_amount: f64) -> f64 {
        let amount = to_decimal(order_amount);
        let raw = match self.discount_type {
            DiscountType::Percentage => {
                let mut discount = amount * to_decimal(self.discount_value) / Decimal::from(100);
                if let Some(cap) = self.max_discount_amount {
                    discount = discount.min(to_decimal(cap));
                }
                discount
            }
            DiscountType::Fixed => to_decimal(self.discount_value).min(amount),
        };
        raw.clamp(Decimal::ZERO, amount)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
            .unwrap_or(0.0)
    }

    /// Whether the current time falls inside the validity window
    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        now >= self.valid_from && now <= self.valid_until
    }
}

/// Create coupon payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CouponCreate {
    #[validate(length(min = 2, max = 32, message = "Code must be 2-32 characters"))]
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub min_order_amount: Option<f64>,
    pub max_discount_amount: Option<f64>,
    pub usage_limit: Option<u32>,
    pub user_usage_limit: Option<u32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: Option<bool>,
    pub applicable_products: Option<Vec<String>>,
    pub excluded_products: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn coupon(discount_type: DiscountType, value: f64, cap: Option<f64>) -> Coupon {
        Coupon {
            id: None,
            code: "SAVE10".into(),
            description: None,
            discount_type,
            discount_value: value,
            min_order_amount: 0.0,
            max_discount_amount: cap,
            usage_limit: None,
            used_count: 0,
            user_usage_limit: 1,
            valid_from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            valid_until: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            is_active: true,
            applicable_products: vec![],
            excluded_products: vec![],
            created_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let c = coupon(DiscountType::Percentage, 10.0, None);
        assert_eq!(c.calculate_discount(1000.0), 100.0);
    }

    #[test]
    fn test_percentage_capped() {
        let c = coupon(DiscountType::Percentage, 50.0, Some(30.0));
        assert_eq!(c.calculate_discount(100.0), 30.0);
    }

    #[test]
    fn test_fixed_clamped_to_amount() {
        let c = coupon(DiscountType::Fixed, 25.0, None);
        assert_eq!(c.calculate_discount(10.0), 10.0);
        assert_eq!(c.calculate_discount(100.0), 25.0);
    }

    #[test]
    fn test_discount_never_exceeds_amount() {
        let c = coupon(DiscountType::Percentage, 150.0, None);
        assert_eq!(c.calculate_discount(40.0), 40.0);
    }

    #[test]
    fn test_rounding_two_decimals() {
        let c = coupon(DiscountType::Percentage, 33.0, None);
        // 9.99 * 33% = 3.2967 -> 3.30
        assert_eq!(c.calculate_discount(9.99), 3.30);
    }

    #[test]
    fn test_validity_window() {
        let c = coupon(DiscountType::Fixed, 5.0, None);
        let inside = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap();
        assert!(c.is_within_window(inside));
        assert!(!c.is_within_window(before));
    }
}
