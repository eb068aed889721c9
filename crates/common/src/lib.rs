//! Shared identifier types for the order service.

mod types;

pub use types::{OrderId, PaymentIntentId};
