//! Shared test harness: in-memory database, recording notifier, seed data.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use engine_server::db::DbService;
use engine_server::db::repository::{CouponRepository, ProductRepository};
use engine_server::services::{Notifier, NotifyError, NotifyService};
use shared::models::{
    Coupon, CouponCreate, DiscountType, DurationSpec, DurationUnit, LineItem, OrderCreate,
    PricingOption, Product, ProductCreate, ProfileTier,
};

/// Notifier that records every send and can fail per recipient
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail_for: Arc<Mutex<HashSet<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, recipient: &str) {
        self.fail_for
            .lock()
            .unwrap()
            .insert(recipient.to_string());
    }

    /// Recorded (recipient, subject) pairs
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, recipient: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to == recipient)
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> Result<(), NotifyError> {
        if self.fail_for.lock().unwrap().contains(to) {
            return Err(NotifyError::Request(format!("injected failure for {to}")));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

pub async fn test_db() -> Surreal<Db> {
    DbService::new_in_memory()
        .await
        .expect("in-memory database")
        .db
}

pub fn notify_service(recorder: &RecordingNotifier) -> NotifyService {
    NotifyService::new(
        Arc::new(recorder.clone()),
        Duration::from_millis(500),
        Some("ops@example.com".to_string()),
    )
}

/// Seed a Netflix-style product with a Premium tier (1.5 months at 1000.00)
/// and a shared-slot tier (1 month at 4.99)
pub async fn seed_product(db: &Surreal<Db>) -> Product {
    let repo = ProductRepository::new(db.clone());
    repo.create(ProductCreate {
        name: "Netflix".to_string(),
        description: Some("Streaming subscription".to_string()),
        platform_type: "netflix".to_string(),
        profile_tiers: vec![
            ProfileTier {
                name: "Premium".to_string(),
                is_shared_profile: false,
                pricing_options: vec![PricingOption {
                    duration: DurationSpec::new(1.5, DurationUnit::Months),
                    price: 1000.0,
                }],
            },
            ProfileTier {
                name: "Shared Slot".to_string(),
                is_shared_profile: true,
                pricing_options: vec![PricingOption {
                    duration: DurationSpec::new(1.0, DurationUnit::Month),
                    price: 4.99,
                }],
            },
        ],
        is_active: Some(true),
    })
    .await
    .expect("seed product")
}

/// A 10% coupon (SAVE10 style) with a global usage limit
pub async fn seed_coupon(db: &Surreal<Db>, code: &str, usage_limit: Option<u32>) -> Coupon {
    let now = Utc::now();
    let repo = CouponRepository::new(db.clone());
    repo.create(
        CouponCreate {
            code: code.to_string(),
            description: Some("10% off".to_string()),
            discount_type: DiscountType::Percentage,
            discount_value: 10.0,
            min_order_amount: None,
            max_discount_amount: None,
            usage_limit,
            user_usage_limit: Some(5),
            valid_from: now - ChronoDuration::days(1),
            valid_until: now + ChronoDuration::days(30),
            is_active: Some(true),
            applicable_products: None,
            excluded_products: None,
        },
        "user:admin",
    )
    .await
    .expect("seed coupon")
}

/// Checkout payload for the Premium tier of `product`
pub fn premium_order(product: &Product, coupon_code: Option<&str>) -> OrderCreate {
    OrderCreate {
        items: vec![LineItem {
            product: product.id.clone().expect("product id"),
            product_name: None,
            tier_name: "Premium".to_string(),
            duration: DurationSpec::new(1.5, DurationUnit::Months),
            price: 1000.0,
            quantity: 1,
            recipient_email: None,
        }],
        payment_method: "bank_transfer".to_string(),
        receipt: Some("receipt-ref-001".to_string()),
        coupon_code: coupon_code.map(str::to_string),
    }
}

/// Checkout payload for the shared-slot tier of `product`
pub fn shared_order(product: &Product) -> OrderCreate {
    OrderCreate {
        items: vec![LineItem {
            product: product.id.clone().expect("product id"),
            product_name: None,
            tier_name: "Shared Slot".to_string(),
            duration: DurationSpec::new(1.0, DurationUnit::Month),
            price: 4.99,
            quantity: 1,
            recipient_email: None,
        }],
        payment_method: "bank_transfer".to_string(),
        receipt: Some("receipt-ref-002".to_string()),
        coupon_code: None,
    }
}
