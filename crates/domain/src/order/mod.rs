//! Order record and related types.

mod record;
mod request;
mod state;
mod value_objects;

pub use record::{Order, OrderDetails, PaymentEvent, Transition};
pub use request::ConfirmOrderRequest;
pub use state::PaymentStatus;
pub use value_objects::{LineItem, PaymentMethod};

use thiserror::Error;

/// Errors raised while validating or decoding order data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// One or more required request fields were absent.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// The payment method is not one of the accepted values.
    #[error("Invalid payment method: {0} (expected card, zelle, paypal or cash)")]
    UnknownPaymentMethod(String),

    /// A stored payment status string has no matching variant.
    #[error("Unknown payment status: {0}")]
    UnknownPaymentStatus(String),

    /// A line item carries a negative price.
    #[error("Invalid price for {product}: must not be negative")]
    NegativePrice { product: String },

    /// The order total is negative.
    #[error("Invalid total amount: must not be negative")]
    NegativeTotal,
}
