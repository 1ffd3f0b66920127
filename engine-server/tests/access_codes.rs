//! Access code lifecycle: issue, request, validate, lazy expiry.

mod common;

use chrono::{Duration, Utc};
use common::*;
use engine_server::db::repository::AccessCodeRepository;
use engine_server::engine::{AccessCodeIssuer, EntitlementProvisioner, OrderLedger};
use shared::error::ErrorCode;
use shared::models::{AccessCodeStatus, CredentialBundle, PaymentStatus};

const BOB: &str = "user:bob";
const BOB_EMAIL: &str = "bob@example.com";

/// Deliver a shared-slot subscription for Bob and return its id
async fn delivered_shared_subscription(
    db: &surrealdb::Surreal<surrealdb::engine::local::Db>,
    notify: &engine_server::services::NotifyService,
) -> String {
    let product = seed_product(db).await;
    let ledger = OrderLedger::new(db.clone(), notify.clone());
    let order = ledger
        .create(BOB, BOB_EMAIL, shared_order(&product))
        .await
        .unwrap();
    let order_id = order.id.unwrap();
    ledger
        .set_payment_status(&order_id, PaymentStatus::Completed, None)
        .await
        .unwrap();

    let provisioner = EntitlementProvisioner::new(db.clone(), notify.clone());
    let credentials = CredentialBundle {
        email: Some("shared@netflix.example".to_string()),
        password: Some("secret".to_string()),
        profile_name: Some("Slot 3".to_string()),
        pin: Some("1234".to_string()),
        ..Default::default()
    };
    let outcome = provisioner
        .deliver(&order_id, credentials, None, None, None)
        .await
        .unwrap();
    outcome.subscriptions[0].id.clone().unwrap()
}

#[tokio::test]
async fn test_duplicate_active_code_rejected() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    let notify = notify_service(&recorder);
    let subscription_id = delivered_shared_subscription(&db, &notify).await;

    let issuer = AccessCodeIssuer::new(db.clone(), notify, 24);
    issuer
        .issue(&subscription_id, None, Some(BOB_EMAIL), None)
        .await
        .unwrap();

    let err = issuer
        .issue(&subscription_id, None, Some(BOB_EMAIL), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateActiveCode);
}

#[tokio::test]
async fn test_concurrent_validate_single_winner() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    let notify = notify_service(&recorder);
    let subscription_id = delivered_shared_subscription(&db, &notify).await;

    let issuer = AccessCodeIssuer::new(db.clone(), notify.clone(), 24);
    let code = issuer
        .issue(&subscription_id, None, None, None)
        .await
        .unwrap();

    let issuer_a = AccessCodeIssuer::new(db.clone(), notify.clone(), 24);
    let issuer_b = AccessCodeIssuer::new(db.clone(), notify, 24);
    let (a, b) = tokio::join!(
        issuer_a.validate(&code.code, Some(BOB)),
        issuer_b.validate(&code.code, Some("user:mallory")),
    );

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);

    let (winner, loser) = if a.is_ok() {
        (a.unwrap(), b.unwrap_err())
    } else {
        (b.unwrap(), a.unwrap_err())
    };
    assert_eq!(winner.email.as_deref(), Some("shared@netflix.example"));
    assert_eq!(winner.pin.as_deref(), Some("1234"));
    assert_eq!(loser.code, ErrorCode::AccessCodeAlreadyUsed);
}

#[tokio::test]
async fn test_credential_view_never_exposes_password() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    let notify = notify_service(&recorder);
    let subscription_id = delivered_shared_subscription(&db, &notify).await;

    let issuer = AccessCodeIssuer::new(db.clone(), notify, 24);
    let code = issuer
        .issue(&subscription_id, None, None, None)
        .await
        .unwrap();
    let view = issuer.validate(&code.code, Some(BOB)).await.unwrap();

    let json = serde_json::to_value(&view).unwrap();
    assert!(json.get("password").is_none());
    assert_eq!(view.profile_name.as_deref(), Some("Slot 3"));
}

#[tokio::test]
async fn test_lazy_expiry_flips_stored_status() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    let notify = notify_service(&recorder);
    let subscription_id = delivered_shared_subscription(&db, &notify).await;

    let issuer = AccessCodeIssuer::new(db.clone(), notify, 24);
    let code = issuer
        .issue(&subscription_id, None, None, None)
        .await
        .unwrap();

    // Force the deadline into the past (T+25h equivalent)
    db.query("UPDATE access_code SET expires_at = $past WHERE code = $code")
        .bind(("past", Utc::now() - Duration::hours(1)))
        .bind(("code", code.code.clone()))
        .await
        .unwrap();

    let err = issuer.validate(&code.code, Some(BOB)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AccessCodeNotFound);

    // Lazy expiry persisted the flip
    let stored = AccessCodeRepository::new(db.clone())
        .find_by_code(&code.code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, AccessCodeStatus::Expired);
}

#[tokio::test]
async fn test_reissue_after_consume() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    let notify = notify_service(&recorder);
    let subscription_id = delivered_shared_subscription(&db, &notify).await;

    let issuer = AccessCodeIssuer::new(db.clone(), notify, 24);
    let first = issuer
        .issue(&subscription_id, None, None, None)
        .await
        .unwrap();
    issuer.validate(&first.code, Some(BOB)).await.unwrap();

    // The consumed code no longer blocks a fresh issue
    let second = issuer
        .issue(&subscription_id, None, None, None)
        .await
        .unwrap();
    assert_ne!(first.code, second.code);
    assert_eq!(second.status, AccessCodeStatus::Active);
}

#[tokio::test]
async fn test_request_access_records_pending_request() {
    let db = test_db().await;
    let recorder = RecordingNotifier::new();
    let notify = notify_service(&recorder);
    let subscription_id = delivered_shared_subscription(&db, &notify).await;

    let issuer = AccessCodeIssuer::new(db.clone(), notify, 24);
    let updated = issuer.request_access(&subscription_id, BOB).await.unwrap();
    assert_eq!(updated.access_code_requests.len(), 1);
    assert_eq!(updated.access_code_requests[0].user, BOB);

    let pending = issuer.list_pending_requests().await.unwrap();
    assert_eq!(pending.len(), 1);
}
