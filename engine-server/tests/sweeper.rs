//! Expiry sweep: bulk expiry, warning window, per-item failure tolerance.

mod common;

use chrono::{Duration, Utc};
use common::*;
use engine_server::db::repository::{OrderRepository, SubscriptionRepository};
use engine_server::engine::ExpirySweeper;
use shared::models::{
    CredentialBundle, DurationSpec, DurationUnit, FulfillmentStatus, Order, PaymentStatus,
    Subscription, SubscriptionStatus,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const ACCOUNT_EMAIL: &str = "account@stream.example";

async fn seed_order(db: &Surreal<Db>, user: &str, buyer_email: &str) -> String {
    let now = Utc::now();
    let order = Order {
        id: None,
        user: user.to_string(),
        user_email: buyer_email.to_string(),
        items: vec![],
        original_amount: 4.99,
        discount_amount: 0.0,
        total_amount: 4.99,
        coupon_code: None,
        payment_method: "transfer".to_string(),
        payment_status: PaymentStatus::Completed,
        status: FulfillmentStatus::Delivered,
        payment_result: None,
        delivery: None,
        receipt: "receipt-ref".to_string(),
        admin_notes: None,
        created_at: Some(now),
        updated_at: Some(now),
    };
    OrderRepository::new(db.clone())
        .create(order)
        .await
        .unwrap()
        .id
        .unwrap()
}

fn subscription(user: &str, order_id: &str, expires_in_days: i64) -> Subscription {
    let now = Utc::now();
    Subscription {
        id: None,
        user: user.to_string(),
        order_id: order_id.to_string(),
        product: "product:netflix".to_string(),
        product_name: Some("Netflix".to_string()),
        platform_type: "netflix".to_string(),
        tier_name: "Premium".to_string(),
        start_date: now - Duration::days(30),
        expiry_date: now + Duration::days(expires_in_days),
        duration: DurationSpec::new(1.0, DurationUnit::Month),
        status: SubscriptionStatus::Active,
        credentials: CredentialBundle {
            email: Some(ACCOUNT_EMAIL.to_string()),
            ..Default::default()
        },
        activation_key: None,
        auto_renew: false,
        notes: None,
        access_code_requests: vec![],
        signin_code_requests: vec![],
        created_at: Some(now),
        updated_at: Some(now),
    }
}

#[tokio::test]
async fn test_sweep_expires_and_warns_buyer() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    let notify = notify_service(&recorder);

    let repo = SubscriptionRepository::new(db.clone());
    let late_order = seed_order(&db, "user:late", "late@example.com").await;
    let soon_order = seed_order(&db, "user:soon", "soon@example.com").await;
    let far_order = seed_order(&db, "user:far", "far@example.com").await;
    repo.create(subscription("user:late", &late_order, -1))
        .await
        .unwrap();
    repo.create(subscription("user:soon", &soon_order, 2))
        .await
        .unwrap();
    repo.create(subscription("user:far", &far_order, 30))
        .await
        .unwrap();

    let sweeper = ExpirySweeper::new(db.clone(), notify, 3, 3600);
    let report = sweeper.sweep(Utc::now()).await.unwrap();

    assert_eq!(report.expired, 1);
    assert_eq!(report.warned, 1);
    assert_eq!(report.skipped, 0);

    // The buyer gets the warning, never the provisioned account address
    assert_eq!(recorder.sent_to("soon@example.com"), 1);
    assert_eq!(recorder.sent_to(ACCOUNT_EMAIL), 0);
    assert_eq!(recorder.sent_to("far@example.com"), 0);

    // Overdue row was transitioned in storage
    let late = repo.find_by_user("user:late").await.unwrap();
    assert_eq!(late[0].status, SubscriptionStatus::Expired);
    let far = repo.find_by_user("user:far").await.unwrap();
    assert_eq!(far[0].status, SubscriptionStatus::Active);
}

#[tokio::test]
async fn test_sweep_tolerates_notifier_failure() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    recorder.fail_for("soon@example.com");
    let notify = notify_service(&recorder);

    let repo = SubscriptionRepository::new(db.clone());
    let soon_order = seed_order(&db, "user:soon", "soon@example.com").await;
    let also_order = seed_order(&db, "user:also", "also@example.com").await;
    repo.create(subscription("user:soon", &soon_order, 2))
        .await
        .unwrap();
    repo.create(subscription("user:also", &also_order, 1))
        .await
        .unwrap();

    let sweeper = ExpirySweeper::new(db.clone(), notify, 3, 3600);
    let report = sweeper.sweep(Utc::now()).await.unwrap();

    assert_eq!(report.expired, 0);
    assert_eq!(report.warned, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(recorder.sent_to("also@example.com"), 1);
}

#[tokio::test]
async fn test_sweep_skips_missing_buyer_email() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    let notify = notify_service(&recorder);

    let repo = SubscriptionRepository::new(db.clone());
    let anon_order = seed_order(&db, "user:anon", "").await;
    repo.create(subscription("user:anon", &anon_order, 1))
        .await
        .unwrap();
    // Dangling order reference is skipped too
    repo.create(subscription("user:gone", "orders:missing", 2))
        .await
        .unwrap();

    let sweeper = ExpirySweeper::new(db.clone(), notify, 3, 3600);
    let report = sweeper.sweep(Utc::now()).await.unwrap();

    assert_eq!(report.warned, 0);
    assert_eq!(report.skipped, 2);
    assert!(recorder.sent().is_empty());
}
