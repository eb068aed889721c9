//! Checkout error types.

use domain::OrderError;
use order_store::StoreError;
use payments::GatewayError;
use thiserror::Error;

/// Errors surfaced to the caller of the checkout workflows.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request was incomplete or malformed. Nothing was written or sent.
    #[error("{0}")]
    Validation(#[from] OrderError),

    /// The order could not be stored and the owner could not be notified either.
    #[error("Order could not be recorded. Please contact the shop directly.")]
    Unrecorded {
        #[source]
        source: StoreError,
    },

    /// The webhook signature did not verify.
    #[error("Invalid signature")]
    InvalidSignature(#[source] GatewayError),

    /// The webhook was signed but its body is not a gateway event.
    #[error("Invalid payload")]
    InvalidPayload(#[source] GatewayError),
}

impl From<GatewayError> for CheckoutError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::MalformedPayload(_) => CheckoutError::InvalidPayload(err),
            _ => CheckoutError::InvalidSignature(err),
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
