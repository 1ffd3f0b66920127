//! Order ledger
//!
//! Owns the order entity and its two status axes. Fulfillment:
//! `pending -> {confirmed, processing, cancelled}`, `processing ->
//! {delivered, refunded}`. Payment: `pending -> {completed, failed} ->
//! refunded`. A completed payment forces fulfillment to processing, but
//! delivery is always an explicit operator action.

use chrono::Utc;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    FulfillmentStatus, LineItem, Order, OrderCreate, PaymentResult, PaymentStatus,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::repository::{OrderRepository, ProductRepository};
use crate::engine::discount::DiscountEngine;
use crate::services::{NotifyService, templates};

fn round2(value: f64) -> f64 {
    Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

pub struct OrderLedger {
    orders: OrderRepository,
    products: ProductRepository,
    discount: DiscountEngine,
    notify: NotifyService,
}

impl OrderLedger {
    pub fn new(db: Surreal<Db>, notify: NotifyService) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            discount: DiscountEngine::new(db),
            notify,
        }
    }

    /// Create an order from validated line items
    ///
    /// Every item must resolve to an active product and a catalog-listed
    /// tier and pricing option; the authoritative total is the computed sum,
    /// minus a coupon discount locked here at creation time. Notification
    /// failures never fail the create.
    pub async fn create(
        &self,
        user_id: &str,
        user_email: &str,
        payload: OrderCreate,
    ) -> AppResult<Order> {
        let receipt = payload
            .receipt
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| AppError::new(ErrorCode::ReceiptRequired))?
            .to_string();

        if payload.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }

        let mut items = Vec::with_capacity(payload.items.len());
        let mut original = Decimal::ZERO;
        for item in payload.items {
            let validated = self.validate_line_item(item).await?;
            original += Decimal::from_f64(validated.price).unwrap_or_default()
                * Decimal::from(validated.quantity);
            items.push(validated);
        }
        let original_amount = round2(original.to_f64().unwrap_or(0.0));

        let product_ids: Vec<String> = items.iter().map(|i| i.product.clone()).collect();
        let now = Utc::now();

        let (coupon_code, discount_amount) = match payload.coupon_code.as_deref() {
            Some(code) if !code.trim().is_empty() => {
                let preview = self
                    .discount
                    .validate(code, user_id, original_amount, &product_ids, now)
                    .await?;
                (Some(preview.code), preview.discount_amount)
            }
            _ => (None, 0.0),
        };
        let total_amount = round2((original_amount - discount_amount).max(0.0));

        let order = Order {
            id: None,
            user: user_id.to_string(),
            user_email: user_email.to_string(),
            items,
            original_amount,
            discount_amount,
            total_amount,
            coupon_code: coupon_code.clone(),
            payment_method: payload.payment_method,
            payment_status: PaymentStatus::Pending,
            status: FulfillmentStatus::Pending,
            payment_result: None,
            delivery: None,
            receipt,
            admin_notes: None,
            created_at: Some(now),
            updated_at: Some(now),
        };

        let created = self.orders.create(order).await?;

        // Usage counters commit only after the order row exists; a failure
        // here is logged, the order stands with its locked discount.
        if let Some(code) = &coupon_code
            && let Err(e) = self.discount.apply(code, user_id).await
        {
            tracing::error!(
                order = created.id.as_deref().unwrap_or("-"),
                coupon = %code,
                error = %e,
                "Failed to commit coupon usage"
            );
        }

        let (subject, body) = templates::order_confirmation(&created);
        self.notify.dispatch(user_email, subject, body);
        let (subject, body) = templates::new_order_alert(&created);
        self.notify.dispatch_operator(subject, body);

        Ok(created)
    }

    /// Payment gateway confirmation or operator payment override
    ///
    /// The persisted update is conditional on the previously-read payment
    /// status; a lost race surfaces as a status conflict.
    pub async fn set_payment_status(
        &self,
        order_id: &str,
        status: PaymentStatus,
        gateway_result: Option<PaymentResult>,
    ) -> AppResult<Order> {
        let order = self.get(order_id).await?;

        if !order.payment_status.can_transition_to(status) {
            return Err(AppError::new(ErrorCode::PaymentStatusConflict)
                .with_detail("from", format!("{:?}", order.payment_status))
                .with_detail("to", format!("{:?}", status)));
        }

        let won = self
            .orders
            .update_payment_status(order_id, order.payment_status, status, gateway_result)
            .await?;
        if !won {
            return Err(AppError::new(ErrorCode::PaymentStatusConflict));
        }

        let updated = self.get(order_id).await?;

        // Notify only when the forced pending -> processing flip happened
        if updated.status != order.status {
            let (subject, body) = templates::status_change(&updated);
            self.notify.dispatch(updated.user_email.clone(), subject, body);
        }

        Ok(updated)
    }

    /// Operator fulfillment override, validated against the transition table
    pub async fn set_fulfillment_status(
        &self,
        order_id: &str,
        status: FulfillmentStatus,
        admin_notes: Option<String>,
    ) -> AppResult<Order> {
        let order = self.get(order_id).await?;

        if !order.status.can_transition_to(status) {
            return Err(AppError::new(ErrorCode::InvalidStatusTransition)
                .with_detail("from", format!("{:?}", order.status))
                .with_detail("to", format!("{:?}", status)));
        }

        let won = self
            .orders
            .update_fulfillment_status(order_id, order.status, status, admin_notes)
            .await?;
        if !won {
            return Err(AppError::new(ErrorCode::InvalidStatusTransition));
        }

        let updated = self.get(order_id).await?;
        let (subject, body) = templates::status_change(&updated);
        self.notify.dispatch(updated.user_email.clone(), subject, body);

        Ok(updated)
    }

    pub async fn get(&self, order_id: &str) -> AppResult<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))
    }

    /// Fetch with an ownership check: the owner or an operator
    pub async fn get_checked(&self, order_id: &str, user_id: &str, is_admin: bool) -> AppResult<Order> {
        let order = self.get(order_id).await?;
        if !is_admin && order.user != user_id {
            return Err(AppError::forbidden("Not your order"));
        }
        Ok(order)
    }

    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Order>> {
        Ok(self.orders.find_by_user(user_id).await?)
    }

    pub async fn list_all(
        &self,
        status: Option<FulfillmentStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> AppResult<Vec<Order>> {
        Ok(self.orders.find_all(status, payment_status).await?)
    }

    async fn validate_line_item(&self, item: LineItem) -> AppResult<LineItem> {
        if item.quantity == 0 {
            return Err(AppError::validation("Quantity must be positive"));
        }
        if item.price <= 0.0 {
            return Err(AppError::validation("Price must be positive"));
        }

        let product = self
            .products
            .find_by_id(&item.product)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::ProductNotFound).with_detail("product", item.product.clone())
            })?;
        if !product.is_active {
            return Err(AppError::new(ErrorCode::ProductInactive)
                .with_detail("product", item.product.clone()));
        }

        let tier = product.tier(&item.tier_name).ok_or_else(|| {
            AppError::new(ErrorCode::ProfileTierNotFound).with_detail("tier", item.tier_name.clone())
        })?;
        let option = tier.pricing_option(&item.duration).ok_or_else(|| {
            AppError::new(ErrorCode::PricingOptionNotFound)
                .with_detail("duration", item.duration.to_string())
        })?;
        if (option.price - item.price).abs() > f64::EPSILON {
            return Err(AppError::new(ErrorCode::ProductInvalidPrice)
                .with_detail("expected", option.price)
                .with_detail("got", item.price));
        }

        Ok(LineItem {
            product_name: Some(product.name.clone()),
            ..item
        })
    }
}
