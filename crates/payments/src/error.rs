//! Payment gateway error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur when talking to the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The amount is zero, negative or not representable in minor units.
    #[error("Amount must be greater than 0 (got {0})")]
    InvalidAmount(Decimal),

    /// The provider rejected the request.
    #[error("Payment provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// The provider could not be reached or answered with an unreadable body.
    #[error("Payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The webhook signature header is missing, malformed or does not match.
    #[error("Invalid signature: {0}")]
    InvalidSignature(&'static str),

    /// The webhook body is not a valid event.
    #[error("Invalid payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// The referenced payment intent does not exist.
    #[error("Payment intent not found: {0}")]
    IntentNotFound(String),
}

impl GatewayError {
    /// Returns true for errors that mean an inbound webhook must not be trusted.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::InvalidSignature(_) | GatewayError::MalformedPayload(_)
        )
    }
}

/// Convenience type alias for gateway results.
pub type Result<T> = std::result::Result<T, GatewayError>;
