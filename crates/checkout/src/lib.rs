//! Order confirmation and payment reconciliation.
//!
//! [`OrderConfirmation`] validates and records incoming orders and triggers their notifications;
//! [`WebhookReconciler`] applies verified gateway events to the matching stored order.

pub mod confirmation;
pub mod error;
pub mod reconciler;
pub mod task;

pub use confirmation::{Confirmation, OrderConfirmation, PersistOutcome};
pub use error::{CheckoutError, Result};
pub use reconciler::{ReconcileOutcome, WebhookReconciler};
pub use task::NotificationTask;
