//! Shared Data Models
//!
//! Domain entities and request/response payloads shared between crates.

pub mod access_code;
pub mod coupon;
pub mod duration;
pub mod order;
pub mod product;
pub mod subscription;

pub use access_code::{AccessCode, AccessCodeStatus, CredentialView};
pub use coupon::{Coupon, CouponCreate, DiscountType};
pub use duration::{DurationSpec, DurationUnit};
pub use order::{
    DeliveryDetails, FulfillmentStatus, LineItem, Order, OrderCreate, PaymentResult, PaymentStatus,
};
pub use product::{PricingOption, Product, ProductCreate, ProfileTier};
pub use subscription::{
    AccessRequest, CredentialBundle, Subscription, SubscriptionStatus, SubscriptionUpdate,
};
