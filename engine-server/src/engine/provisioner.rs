//! Entitlement provisioner
//!
//! Turns a fulfilled order into subscriptions, idempotently. First delivery
//! creates exactly one subscription per line item and flips the order to
//! delivered; re-delivery overwrites credentials in place and never creates
//! rows, the explicit "resend credentials" affordance.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    CredentialBundle, DeliveryDetails, FulfillmentStatus, Order, Subscription, SubscriptionStatus,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::repository::{OrderRepository, ProductRepository, SubscriptionRepository};
use crate::engine::duration;
use crate::services::{NotifyService, templates};

/// Result of a delivery call
#[derive(Debug, Serialize)]
pub struct DeliveryOutcome {
    pub order: Order,
    pub subscriptions: Vec<Subscription>,
    pub is_redelivery: bool,
}

pub struct EntitlementProvisioner {
    orders: OrderRepository,
    subscriptions: SubscriptionRepository,
    products: ProductRepository,
    notify: NotifyService,
}

impl EntitlementProvisioner {
    pub fn new(db: Surreal<Db>, notify: NotifyService) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            subscriptions: SubscriptionRepository::new(db.clone()),
            products: ProductRepository::new(db),
            notify,
        }
    }

    /// Deliver (or re-deliver) an order
    ///
    /// The delivery payload is always overwritten with the supplied bundle;
    /// `delivered_at` is preserved from the first delivery. Calling this
    /// twice never duplicates subscriptions.
    pub async fn deliver(
        &self,
        order_id: &str,
        credentials: CredentialBundle,
        activation_key: Option<String>,
        instructions: Option<String>,
        start: Option<DateTime<Utc>>,
    ) -> AppResult<DeliveryOutcome> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        let mut is_redelivery = order.status == FulfillmentStatus::Delivered;
        if !is_redelivery && !order.status.can_transition_to(FulfillmentStatus::Delivered) {
            return Err(AppError::new(ErrorCode::OrderNotDeliverable)
                .with_detail("status", format!("{:?}", order.status)));
        }

        let now = Utc::now();
        let payload = |delivered_at| DeliveryDetails {
            credentials: Some(credentials.clone()),
            activation_key: activation_key.clone(),
            instructions: instructions.clone(),
            delivered_at: Some(delivered_at),
        };

        let order = if is_redelivery {
            let delivered_at = order
                .delivery
                .as_ref()
                .and_then(|d| d.delivered_at)
                .unwrap_or(now);
            self.orders
                .set_delivery(order_id, payload(delivered_at))
                .await?
        } else {
            match self
                .orders
                .set_delivery_if(order_id, payload(now), order.status)
                .await?
            {
                Some(updated) => updated,
                None => {
                    // Lost the flip to a concurrent delivery; the winner's
                    // row decides delivered_at and we overwrite in place.
                    is_redelivery = true;
                    let fresh = self
                        .orders
                        .find_by_id(order_id)
                        .await?
                        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
                    if fresh.status != FulfillmentStatus::Delivered {
                        return Err(AppError::new(ErrorCode::OrderNotDeliverable)
                            .with_detail("status", format!("{:?}", fresh.status)));
                    }
                    let delivered_at = fresh
                        .delivery
                        .as_ref()
                        .and_then(|d| d.delivered_at)
                        .unwrap_or(now);
                    self.orders
                        .set_delivery(order_id, payload(delivered_at))
                        .await?
                }
            }
        };

        let subscriptions = if is_redelivery {
            self.refresh_credentials(&order, credentials, activation_key)
                .await?
        } else {
            self.provision(&order, credentials, activation_key, start.unwrap_or(now))
                .await?
        };

        for subscription in &subscriptions {
            let recipient = order
                .items
                .iter()
                .find(|item| item.product == subscription.product)
                .and_then(|item| item.recipient_email.clone())
                .unwrap_or_else(|| order.user_email.clone());
            let (subject, body) = templates::subscription_delivered(subscription);
            self.notify.dispatch(recipient, subject, body);
        }

        Ok(DeliveryOutcome {
            order,
            subscriptions,
            is_redelivery,
        })
    }

    /// First delivery: one subscription per line item
    async fn provision(
        &self,
        order: &Order,
        credentials: CredentialBundle,
        activation_key: Option<String>,
        start: DateTime<Utc>,
    ) -> AppResult<Vec<Subscription>> {
        let order_id = order.id.clone().unwrap_or_default();
        let mut created = Vec::with_capacity(order.items.len());

        for item in &order.items {
            let product = self
                .products
                .find_by_id(&item.product)
                .await?
                .ok_or_else(|| {
                    AppError::new(ErrorCode::ProductNotFound)
                        .with_detail("product", item.product.clone())
                })?;
            let is_shared = product
                .tier(&item.tier_name)
                .map(|t| t.is_shared_profile)
                .unwrap_or(false);

            let mut bundle = credentials.clone();
            bundle.is_shared_profile = is_shared;

            let subscription = Subscription {
                id: None,
                user: order.user.clone(),
                order_id: order_id.clone(),
                product: item.product.clone(),
                product_name: Some(product.name.clone()),
                platform_type: product.platform_type.clone(),
                tier_name: item.tier_name.clone(),
                start_date: start,
                expiry_date: duration::expiry_for(start, &item.duration),
                duration: item.duration,
                status: SubscriptionStatus::Active,
                credentials: bundle,
                activation_key: activation_key.clone(),
                auto_renew: false,
                notes: None,
                access_code_requests: vec![],
                signin_code_requests: vec![],
                created_at: Some(start),
                updated_at: Some(start),
            };
            created.push(self.subscriptions.create(subscription).await?);
        }

        Ok(created)
    }

    /// Re-delivery: overwrite credentials on the existing subscriptions
    /// matching a line item, never create new ones
    async fn refresh_credentials(
        &self,
        order: &Order,
        credentials: CredentialBundle,
        activation_key: Option<String>,
    ) -> AppResult<Vec<Subscription>> {
        let order_id = order.id.clone().unwrap_or_default();
        let existing = self.subscriptions.find_by_order(&order_id).await?;

        let mut updated = Vec::new();
        for subscription in existing {
            let matches_item = order
                .items
                .iter()
                .any(|item| item.product == subscription.product);
            if !matches_item {
                continue;
            }

            let mut bundle = credentials.clone();
            bundle.is_shared_profile = subscription.credentials.is_shared_profile;

            let id = subscription.id.clone().unwrap_or_default();
            updated.push(
                self.subscriptions
                    .update_credentials(&id, bundle, activation_key.clone())
                    .await?,
            );
        }

        tracing::info!(
            order = %order_id,
            refreshed = updated.len(),
            "Credentials re-delivered"
        );
        Ok(updated)
    }
}
