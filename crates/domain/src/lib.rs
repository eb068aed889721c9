//! Domain layer for the order service.
//!
//! This crate provides:
//! - The order record shared by the store, the notification dispatcher and the API
//! - Validation of incoming confirmation requests
//! - Payment status rules applied at confirmation and during webhook reconciliation

pub mod order;

pub use common::{OrderId, PaymentIntentId};
pub use order::{
    ConfirmOrderRequest, LineItem, Order, OrderDetails, OrderError, PaymentEvent, PaymentMethod,
    PaymentStatus, Transition,
};
