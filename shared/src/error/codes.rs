//! Unified error codes for the entitlement engine
//!
//! This module defines all error codes used across the server and clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Coupon errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product errors
//! - 7xxx: Subscription errors
//! - 8xxx: Access code errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Operator role required
    AdminRequired = 2002,

    // ==================== 3xxx: Coupon ====================
    /// Coupon not found
    CouponNotFound = 3001,
    /// Coupon is not active
    CouponInactive = 3002,
    /// Coupon is not yet valid
    CouponNotYetValid = 3003,
    /// Coupon validity window has passed
    CouponExpired = 3004,
    /// Coupon global usage limit reached
    CouponUsageLimitReached = 3005,
    /// Coupon per-user usage limit reached
    CouponUserLimitReached = 3006,
    /// Order amount below coupon minimum
    CouponMinAmountNotMet = 3007,
    /// Coupon not applicable to any product in the order
    CouponNotApplicable = 3008,
    /// Coupon excluded for a product in the order
    CouponProductExcluded = 3009,
    /// Coupon code already exists
    CouponCodeExists = 3010,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no line items
    OrderEmpty = 4002,
    /// Payment receipt evidence is required
    ReceiptRequired = 4003,
    /// Illegal order status transition
    InvalidStatusTransition = 4004,
    /// Order is not in a deliverable state
    OrderNotDeliverable = 4005,

    // ==================== 5xxx: Payment ====================
    /// Invalid payment method
    PaymentInvalidMethod = 5001,
    /// Payment status changed concurrently
    PaymentStatusConflict = 5002,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product is not available
    ProductInactive = 6002,
    /// Product has invalid price or quantity
    ProductInvalidPrice = 6003,
    /// Profile tier not found on product
    ProfileTierNotFound = 6004,
    /// No pricing option matches the requested duration/price
    PricingOptionNotFound = 6005,

    // ==================== 7xxx: Subscription ====================
    /// Subscription not found
    SubscriptionNotFound = 7001,
    /// Subscription is not a shared profile
    SubscriptionNotShared = 7002,
    /// Subscription is not active
    SubscriptionNotActive = 7003,

    // ==================== 8xxx: Access code ====================
    /// Access code not found (or expired)
    AccessCodeNotFound = 8001,
    /// Access code has already been used
    AccessCodeAlreadyUsed = 8002,
    /// An active access code already exists for this user
    DuplicateActiveCode = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Notification dispatch failed
    NotificationFailed = 9101,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid credentials",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Operator role is required",

            // Coupon
            ErrorCode::CouponNotFound => "Invalid coupon code",
            ErrorCode::CouponInactive => "This coupon is no longer active",
            ErrorCode::CouponNotYetValid => "This coupon is not yet valid",
            ErrorCode::CouponExpired => "This coupon has expired",
            ErrorCode::CouponUsageLimitReached => "This coupon has reached its usage limit",
            ErrorCode::CouponUserLimitReached => {
                "You have already used this coupon the maximum number of times"
            }
            ErrorCode::CouponMinAmountNotMet => "Order amount is below the coupon minimum",
            ErrorCode::CouponNotApplicable => {
                "This coupon is not applicable to the products in your order"
            }
            ErrorCode::CouponProductExcluded => {
                "This coupon cannot be applied to some products in your order"
            }
            ErrorCode::CouponCodeExists => "Coupon code already exists",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order has no line items",
            ErrorCode::ReceiptRequired => "Payment receipt is required",
            ErrorCode::InvalidStatusTransition => "Illegal order status transition",
            ErrorCode::OrderNotDeliverable => "Order is not in a deliverable state",

            // Payment
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",
            ErrorCode::PaymentStatusConflict => "Payment status was changed concurrently",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInactive => "Product is not available",
            ErrorCode::ProductInvalidPrice => "Product has invalid price or quantity",
            ErrorCode::ProfileTierNotFound => "Profile tier not found on product",
            ErrorCode::PricingOptionNotFound => "No matching pricing option for this duration",

            // Subscription
            ErrorCode::SubscriptionNotFound => "Subscription not found",
            ErrorCode::SubscriptionNotShared => "This is not a shared profile subscription",
            ErrorCode::SubscriptionNotActive => "Subscription is not active",

            // Access code
            ErrorCode::AccessCodeNotFound => "Invalid or expired code",
            ErrorCode::AccessCodeAlreadyUsed => "Code has already been used",
            ErrorCode::DuplicateActiveCode => {
                "User already has an active code for this subscription"
            }

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::NotificationFailed => "Notification dispatch failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::AdminRequired),

            // Coupon
            3001 => Ok(ErrorCode::CouponNotFound),
            3002 => Ok(ErrorCode::CouponInactive),
            3003 => Ok(ErrorCode::CouponNotYetValid),
            3004 => Ok(ErrorCode::CouponExpired),
            3005 => Ok(ErrorCode::CouponUsageLimitReached),
            3006 => Ok(ErrorCode::CouponUserLimitReached),
            3007 => Ok(ErrorCode::CouponMinAmountNotMet),
            3008 => Ok(ErrorCode::CouponNotApplicable),
            3009 => Ok(ErrorCode::CouponProductExcluded),
            3010 => Ok(ErrorCode::CouponCodeExists),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderEmpty),
            4003 => Ok(ErrorCode::ReceiptRequired),
            4004 => Ok(ErrorCode::InvalidStatusTransition),
            4005 => Ok(ErrorCode::OrderNotDeliverable),

            // Payment
            5001 => Ok(ErrorCode::PaymentInvalidMethod),
            5002 => Ok(ErrorCode::PaymentStatusConflict),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInactive),
            6003 => Ok(ErrorCode::ProductInvalidPrice),
            6004 => Ok(ErrorCode::ProfileTierNotFound),
            6005 => Ok(ErrorCode::PricingOptionNotFound),

            // Subscription
            7001 => Ok(ErrorCode::SubscriptionNotFound),
            7002 => Ok(ErrorCode::SubscriptionNotShared),
            7003 => Ok(ErrorCode::SubscriptionNotActive),

            // Access code
            8001 => Ok(ErrorCode::AccessCodeNotFound),
            8002 => Ok(ErrorCode::AccessCodeAlreadyUsed),
            8003 => Ok(ErrorCode::DuplicateActiveCode),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::NotificationFailed),

            other => Err(InvalidErrorCode(other)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.code(), self.message())
    }
}
