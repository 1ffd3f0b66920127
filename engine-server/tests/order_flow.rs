//! End-to-end order lifecycle against the in-memory database.

mod common;

use chrono::{TimeZone, Utc};
use common::*;
use engine_server::db::repository::SubscriptionRepository;
use engine_server::engine::{EntitlementProvisioner, OrderLedger};
use shared::error::ErrorCode;
use shared::models::{CredentialBundle, FulfillmentStatus, PaymentResult, PaymentStatus};

const ALICE: &str = "user:alice";
const ALICE_EMAIL: &str = "alice@example.com";

#[tokio::test]
async fn test_full_order_lifecycle() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    let notify = notify_service(&recorder);
    let product = seed_product(&db).await;
    seed_coupon(&db, "SAVE10", None).await;

    let ledger = OrderLedger::new(db.clone(), notify.clone());

    // Checkout with a 10% coupon
    let order = ledger
        .create(ALICE, ALICE_EMAIL, premium_order(&product, Some("SAVE10")))
        .await
        .unwrap();
    assert_eq!(order.original_amount, 1000.0);
    assert_eq!(order.discount_amount, 100.0);
    assert_eq!(order.total_amount, 900.0);
    assert_eq!(order.coupon_code.as_deref(), Some("SAVE10"));
    assert_eq!(order.status, FulfillmentStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    let order_id = order.id.clone().unwrap();

    // Payment confirmation forces fulfillment to processing
    let order = ledger
        .set_payment_status(
            &order_id,
            PaymentStatus::Completed,
            Some(PaymentResult {
                transaction_id: Some("txn-1".to_string()),
                raw_status: Some("SUCCESS".to_string()),
            }),
        )
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Completed);
    assert_eq!(order.status, FulfillmentStatus::Processing);

    // Delivery provisions one subscription per line item
    let provisioner = EntitlementProvisioner::new(db.clone(), notify.clone());
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let credentials = CredentialBundle {
        email: Some("account@netflix.example".to_string()),
        password: Some("hunter2".to_string()),
        profile_name: Some("Alice".to_string()),
        ..Default::default()
    };
    let outcome = provisioner
        .deliver(&order_id, credentials, None, None, Some(start))
        .await
        .unwrap();
    assert!(!outcome.is_redelivery);
    assert_eq!(outcome.order.status, FulfillmentStatus::Delivered);
    assert_eq!(outcome.subscriptions.len(), 1);

    // 1.5 months = 45 days
    let expiry = Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap();
    assert_eq!(outcome.subscriptions[0].expiry_date, expiry);
    assert_eq!(outcome.subscriptions[0].start_date, start);

    // Re-delivery refreshes credentials in place, never duplicates rows
    let new_credentials = CredentialBundle {
        email: Some("account2@netflix.example".to_string()),
        password: Some("hunter3".to_string()),
        ..Default::default()
    };
    let outcome = provisioner
        .deliver(&order_id, new_credentials, None, None, None)
        .await
        .unwrap();
    assert!(outcome.is_redelivery);
    assert_eq!(outcome.subscriptions.len(), 1);

    let subs = SubscriptionRepository::new(db.clone())
        .find_by_order(&order_id)
        .await
        .unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(
        subs[0].credentials.email.as_deref(),
        Some("account2@netflix.example")
    );
}

#[tokio::test]
async fn test_concurrent_delivery_provisions_once() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    let notify = notify_service(&recorder);
    let product = seed_product(&db).await;

    let ledger = OrderLedger::new(db.clone(), notify.clone());
    let order = ledger
        .create(ALICE, ALICE_EMAIL, premium_order(&product, None))
        .await
        .unwrap();
    let order_id = order.id.clone().unwrap();
    ledger
        .set_payment_status(&order_id, PaymentStatus::Completed, None)
        .await
        .unwrap();

    let provisioner = EntitlementProvisioner::new(db.clone(), notify.clone());
    let credentials = CredentialBundle {
        email: Some("account@netflix.example".to_string()),
        password: Some("hunter2".to_string()),
        ..Default::default()
    };
    let (a, b) = tokio::join!(
        provisioner.deliver(&order_id, credentials.clone(), None, None, None),
        provisioner.deliver(&order_id, credentials.clone(), None, None, None),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    // Exactly one call wins the first-delivery flip
    let first_deliveries = [a.is_redelivery, b.is_redelivery]
        .iter()
        .filter(|redelivery| !**redelivery)
        .count();
    assert_eq!(first_deliveries, 1);

    let subs = SubscriptionRepository::new(db.clone())
        .find_by_order(&order_id)
        .await
        .unwrap();
    assert_eq!(subs.len(), 1);
}

#[tokio::test]
async fn test_coupon_usage_limit_exhaustion() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    let notify = notify_service(&recorder);
    let product = seed_product(&db).await;
    seed_coupon(&db, "LIMIT1", Some(1)).await;

    let ledger = OrderLedger::new(db.clone(), notify);

    ledger
        .create(ALICE, ALICE_EMAIL, premium_order(&product, Some("LIMIT1")))
        .await
        .unwrap();

    let err = ledger
        .create(
            "user:bob",
            "bob@example.com",
            premium_order(&product, Some("LIMIT1")),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CouponUsageLimitReached);
}

#[tokio::test]
async fn test_order_rejects_price_mismatch() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    let product = seed_product(&db).await;

    let ledger = OrderLedger::new(db.clone(), notify_service(&recorder));
    let mut payload = premium_order(&product, None);
    payload.items[0].price = 1.0;

    let err = ledger.create(ALICE, ALICE_EMAIL, payload).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductInvalidPrice);
}

#[tokio::test]
async fn test_delivery_requires_processing() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    let notify = notify_service(&recorder);
    let product = seed_product(&db).await;

    let ledger = OrderLedger::new(db.clone(), notify.clone());
    let order = ledger
        .create(ALICE, ALICE_EMAIL, premium_order(&product, None))
        .await
        .unwrap();

    // Still pending, not deliverable
    let provisioner = EntitlementProvisioner::new(db.clone(), notify);
    let err = provisioner
        .deliver(
            &order.id.unwrap(),
            CredentialBundle::default(),
            None,
            None,
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotDeliverable);
}

#[tokio::test]
async fn test_notification_failure_never_fails_checkout() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    recorder.fail_for(ALICE_EMAIL);
    recorder.fail_for("ops@example.com");
    let product = seed_product(&db).await;

    let ledger = OrderLedger::new(db.clone(), notify_service(&recorder));
    let order = ledger
        .create(ALICE, ALICE_EMAIL, premium_order(&product, None))
        .await
        .unwrap();
    assert!(order.id.is_some());
}
