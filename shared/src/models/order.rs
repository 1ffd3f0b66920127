//! Order Model

use super::duration::DurationSpec;
use super::subscription::CredentialBundle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payment status enum (parallel axis to fulfillment)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Whether a transition to `next` is legal
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Completed) | (Pending, Failed) | (Completed, Refunded) | (Failed, Refunded)
        )
    }
}

/// Fulfillment status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
    Pending,
    Confirmed,
    Processing,
    Delivered,
    Cancelled,
    Refunded,
}

impl FulfillmentStatus {
    /// Whether a transition to `next` is legal
    ///
    /// `delivered` is terminal for status purposes; re-delivery updates
    /// credentials without a status change. `cancelled` and `refunded`
    /// are terminal.
    pub fn can_transition_to(&self, next: FulfillmentStatus) -> bool {
        use FulfillmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Processing)
                | (Pending, Cancelled)
                | (Confirmed, Processing)
                | (Confirmed, Cancelled)
                | (Processing, Delivered)
                | (Processing, Refunded)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FulfillmentStatus::Delivered | FulfillmentStatus::Cancelled | FulfillmentStatus::Refunded
        )
    }
}

/// One purchased line item
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LineItem {
    /// Product reference
    pub product: String,
    pub product_name: Option<String>,
    /// Chosen profile tier name
    pub tier_name: String,
    pub duration: DurationSpec,
    /// Unit price, must match the catalog price for the chosen option
    pub price: f64,
    pub quantity: u32,
    /// Delivery notifications go here when set, else to the order owner
    #[validate(email(message = "Invalid recipient email"))]
    pub recipient_email: Option<String>,
}

/// Payment gateway confirmation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResult {
    pub transaction_id: Option<String>,
    pub raw_status: Option<String>,
}

/// Delivery payload attached to an order on fulfillment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub credentials: Option<CredentialBundle>,
    pub activation_key: Option<String>,
    pub instructions: Option<String>,
    /// Set on first delivery, preserved across re-deliveries
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Order entity, one purchase event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Buyer reference
    pub user: String,
    /// Buyer email captured at checkout, default notification address
    pub user_email: String,
    pub items: Vec<LineItem>,
    /// Sum of price * quantity before discount
    pub original_amount: f64,
    #[serde(default)]
    pub discount_amount: f64,
    /// `original_amount - discount_amount`, never negative
    pub total_amount: f64,
    pub coupon_code: Option<String>,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub status: FulfillmentStatus,
    pub payment_result: Option<PaymentResult>,
    pub delivery: Option<DeliveryDetails>,
    /// Opaque receipt evidence reference
    pub receipt: String,
    pub admin_notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    #[validate(length(min = 1, message = "Order must contain at least one item"), nested)]
    pub items: Vec<LineItem>,
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
    pub receipt: Option<String>,
    pub coupon_code: Option<String>,
}
