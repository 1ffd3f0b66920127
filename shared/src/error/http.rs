//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::CouponNotFound
            | Self::OrderNotFound
            | Self::ProductNotFound
            | Self::SubscriptionNotFound
            | Self::AccessCodeNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict (state conflicts resolve here, per the error taxonomy)
            Self::AlreadyExists
            | Self::CouponCodeExists
            | Self::CouponUsageLimitReached
            | Self::CouponUserLimitReached
            | Self::InvalidStatusTransition
            | Self::OrderNotDeliverable
            | Self::PaymentStatusConflict
            | Self::AccessCodeAlreadyUsed
            | Self::DuplicateActiveCode => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::AdminRequired => StatusCode::FORBIDDEN,

            // 400 Bad Request
            Self::Unknown
            | Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::CouponInactive
            | Self::CouponNotYetValid
            | Self::CouponExpired
            | Self::CouponMinAmountNotMet
            | Self::CouponNotApplicable
            | Self::CouponProductExcluded
            | Self::OrderEmpty
            | Self::ReceiptRequired
            | Self::PaymentInvalidMethod
            | Self::ProductInactive
            | Self::ProductInvalidPrice
            | Self::ProfileTierNotFound
            | Self::PricingOptionNotFound
            | Self::SubscriptionNotShared
            | Self::SubscriptionNotActive => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::NetworkError
            | Self::TimeoutError
            | Self::ConfigError
            | Self::NotificationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::AdminRequired.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::DuplicateActiveCode.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::AccessCodeAlreadyUsed.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::CouponUsageLimitReached.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
