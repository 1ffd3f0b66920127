//! Notification templates
//!
//! Subject and HTML body builders for every outbound notification.

use shared::models::{Order, Subscription};

/// Buyer confirmation after checkout
pub fn order_confirmation(order: &Order) -> (String, String) {
    let id = order.id.as_deref().unwrap_or("-");
    let subject = format!("Order received ({})", id);
    let items = order
        .items
        .iter()
        .map(|item| {
            format!(
                "<li>{} — {} × {} ({})</li>",
                item.product_name.as_deref().unwrap_or(&item.product),
                item.tier_name,
                item.quantity,
                item.duration
            )
        })
        .collect::<String>();
    let body = format!(
        "<h2>Thank you for your order</h2>\
         <ul>{items}</ul>\
         <p>Total: {:.2}</p>\
         <p>We will confirm your payment and deliver your subscription shortly.</p>",
        order.total_amount
    );
    (subject, body)
}

/// Operator heads-up about a new order
pub fn new_order_alert(order: &Order) -> (String, String) {
    let id = order.id.as_deref().unwrap_or("-");
    let subject = format!("New order {} awaiting review", id);
    let body = format!(
        "<p>Order <b>{}</b> from user <b>{}</b>.</p>\
         <p>Total: {:.2} ({} item(s), paid via {}).</p>",
        id,
        order.user,
        order.total_amount,
        order.items.len(),
        order.payment_method
    );
    (subject, body)
}

/// Buyer-facing order status change
pub fn status_change(order: &Order) -> (String, String) {
    let id = order.id.as_deref().unwrap_or("-");
    let status = serde_json::to_string(&order.status)
        .unwrap_or_default()
        .trim_matches('"')
        .to_string();
    let subject = format!("Order {} update", id);
    let body = format!("<p>Your order <b>{}</b> is now <b>{}</b>.</p>", id, status);
    (subject, body)
}

/// Delivery notification for one provisioned subscription
pub fn subscription_delivered(subscription: &Subscription) -> (String, String) {
    let name = subscription
        .product_name
        .as_deref()
        .unwrap_or(&subscription.platform_type);
    let subject = format!("Your {} subscription is ready", name);
    let mut body = format!(
        "<h2>Subscription delivered</h2>\
         <p>{} ({}) — valid until {}.</p>",
        name,
        subscription.tier_name,
        subscription.expiry_date.format("%Y-%m-%d")
    );
    if subscription.credentials.is_shared_profile {
        body.push_str(
            "<p>This is a shared profile. Request an access code to retrieve your sign-in details.</p>",
        );
    }
    (subject, body)
}

/// Access code delivery; the code itself is the payload
pub fn access_code_issued(code: &str, expires_hours: i64) -> (String, String) {
    let subject = "Your access code".to_string();
    let body = format!(
        "<h2>Access code</h2>\
         <p>Your single-use code: <b>{}</b></p>\
         <p>It expires in {} hours and can be used once.</p>",
        code, expires_hours
    );
    (subject, body)
}

/// Operator heads-up about a pending access-code request
pub fn access_request_alert(subscription: &Subscription, user: &str) -> (String, String) {
    let id = subscription.id.as_deref().unwrap_or("-");
    let subject = "Access code requested".to_string();
    let body = format!(
        "<p>User <b>{}</b> requested an access code for subscription <b>{}</b> ({}).</p>",
        user, id, subscription.platform_type
    );
    (subject, body)
}

/// Expiry warning inside the lookahead window
pub fn expiry_warning(subscription: &Subscription, days_remaining: i64) -> (String, String) {
    let name = subscription
        .product_name
        .as_deref()
        .unwrap_or(&subscription.platform_type);
    let subject = format!("Your {} subscription expires soon", name);
    let body = format!(
        "<p>Your {} subscription ({}) expires in {} day(s), on {}.</p>\
         <p>Renew now to keep your access.</p>",
        name,
        subscription.tier_name,
        days_remaining,
        subscription.expiry_date.format("%Y-%m-%d")
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared::models::{
        CredentialBundle, DurationSpec, DurationUnit, Subscription, SubscriptionStatus,
    };

    fn sample_subscription(shared_profile: bool) -> Subscription {
        Subscription {
            id: Some("subscription:1".into()),
            user: "user:alice".into(),
            order_id: "orders:1".into(),
            product: "product:netflix".into(),
            product_name: Some("Netflix".into()),
            platform_type: "netflix".into(),
            tier_name: "Premium".into(),
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            expiry_date: Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap(),
            duration: DurationSpec::new(1.5, DurationUnit::Months),
            status: SubscriptionStatus::Active,
            credentials: CredentialBundle {
                is_shared_profile: shared_profile,
                ..Default::default()
            },
            activation_key: None,
            auto_renew: false,
            notes: None,
            access_code_requests: vec![],
            signin_code_requests: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_delivery_mentions_shared_profile() {
        let (_, body) = subscription_delivered(&sample_subscription(true));
        assert!(body.contains("shared profile"));

        let (_, body) = subscription_delivered(&sample_subscription(false));
        assert!(!body.contains("shared profile"));
    }

    #[test]
    fn test_access_code_body_contains_code() {
        let (subject, body) = access_code_issued("AB12CD34", 24);
        assert_eq!(subject, "Your access code");
        assert!(body.contains("AB12CD34"));
        assert!(body.contains("24 hours"));
    }

    #[test]
    fn test_expiry_warning_includes_days() {
        let (_, body) = expiry_warning(&sample_subscription(false), 2);
        assert!(body.contains("2 day(s)"));
    }
}
