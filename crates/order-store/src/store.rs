use async_trait::async_trait;
use domain::{Order, OrderDetails, PaymentEvent, Transition};

use crate::{OrderId, OrderQuery, PaymentIntentId, Result};

/// Outcome of reconciling a payment event against a stored order.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentUpdate {
    /// The order after the event was considered.
    pub order: Order,
    pub transition: Transition,
}

/// Core trait for order store implementations.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order in one atomic write.
    ///
    /// On success the order carries its store-assigned identifier. On failure nothing is
    /// written.
    async fn insert(&self, details: OrderDetails) -> Result<Order>;

    /// Retrieves an order by identifier.
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists orders, most recently created first.
    async fn list(&self, query: OrderQuery) -> Result<Vec<Order>>;

    /// Finds the order paid through the given payment intent.
    ///
    /// If several orders reference the same intent, the earliest one is returned.
    async fn find_by_payment_intent(&self, intent_id: &PaymentIntentId) -> Result<Option<Order>>;

    /// Applies a payment event to the order paid through `intent_id`.
    ///
    /// The lookup and the write happen in one transaction. Returns `None` when no order
    /// references the intent; nothing is written in that case.
    async fn apply_payment_event(
        &self,
        intent_id: &PaymentIntentId,
        event: &PaymentEvent,
    ) -> Result<Option<PaymentUpdate>>;
}
