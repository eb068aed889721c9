use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domain::{Order, OrderDetails, PaymentEvent};
use tokio::sync::RwLock;

use crate::{
    OrderId, OrderQuery, PaymentIntentId, Result, StoreError,
    store::{OrderStore, PaymentUpdate},
};

#[derive(Debug, Default)]
struct InMemoryState {
    orders: Vec<Order>,
    last_id: i64,
    fail_writes: bool,
}

/// In-memory order store for testing and local development.
///
/// Provides the same interface as the PostgreSQL implementation. Writes can be made to fail
/// to exercise persistence-failure paths.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail until reset.
    pub async fn set_fail_writes(&self, fail: bool) {
        self.state.write().await.fail_writes = fail;
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, details: OrderDetails) -> Result<Order> {
        let mut state = self.state.write().await;
        if state.fail_writes {
            return Err(StoreError::Unavailable("writes are disabled".to_string()));
        }

        state.last_id += 1;
        let order = Order::new(OrderId::new(state.last_id), details, Utc::now());
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders = state.orders.clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(orders
            .into_iter()
            .skip(query.skip() as usize)
            .take(query.page_size() as usize)
            .collect())
    }

    async fn find_by_payment_intent(&self, intent_id: &PaymentIntentId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .filter(|o| o.details.payment_intent_id.as_ref() == Some(intent_id))
            .min_by_key(|o| o.id)
            .cloned())
    }

    async fn apply_payment_event(
        &self,
        intent_id: &PaymentIntentId,
        event: &PaymentEvent,
    ) -> Result<Option<PaymentUpdate>> {
        let mut state = self.state.write().await;
        let fail_writes = state.fail_writes;

        let Some(order) = state
            .orders
            .iter_mut()
            .filter(|o| o.details.payment_intent_id.as_ref() == Some(intent_id))
            .min_by_key(|o| o.id)
        else {
            return Ok(None);
        };

        let mut updated = order.clone();
        let transition = updated.apply_payment_event(event, Utc::now());
        if transition == domain::Transition::Applied {
            if fail_writes {
                return Err(StoreError::Unavailable("writes are disabled".to_string()));
            }
            *order = updated.clone();
        }

        Ok(Some(PaymentUpdate {
            order: updated,
            transition,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{LineItem, PaymentMethod, PaymentStatus, Transition};
    use rust_decimal_macros::dec;

    fn details(name: &str, intent: Option<&str>) -> OrderDetails {
        OrderDetails {
            customer_name: name.to_string(),
            customer_phone: "555-0100".to_string(),
            customer_email: None,
            delivery_address: "1 Main St".to_string(),
            delivery_date: "2026-03-01".to_string(),
            delivery_time: "14:00".to_string(),
            items: vec![LineItem::new("Rose Bouquet", dec!(45.00))],
            total_amount: dec!(45.00),
            payment_method: PaymentMethod::Card,
            payment_status: PaymentStatus::Succeeded,
            payment_intent_id: intent.map(PaymentIntentId::from),
            notes: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_positive_ids() {
        let store = InMemoryOrderStore::new();
        let first = store.insert(details("A", None)).await.unwrap();
        let second = store.insert(details("B", None)).await.unwrap();

        assert_eq!(first.id, OrderId::new(1));
        assert_eq!(second.id, OrderId::new(2));
        assert_eq!(first.created_at, first.updated_at);
        assert_eq!(store.order_count().await, 2);
    }

    #[tokio::test]
    async fn failed_insert_writes_nothing() {
        let store = InMemoryOrderStore::new();
        store.set_fail_writes(true).await;

        let result = store.insert(details("A", None)).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.order_count().await, 0);

        store.set_fail_writes(false).await;
        let order = store.insert(details("A", None)).await.unwrap();
        assert_eq!(order.id, OrderId::new(1));
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_id() {
        let store = InMemoryOrderStore::new();
        assert!(store.get(OrderId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_most_recent_first_with_pagination() {
        let store = InMemoryOrderStore::new();
        for name in ["A", "B", "C"] {
            store.insert(details(name, None)).await.unwrap();
        }

        let all = store.list(OrderQuery::new()).await.unwrap();
        let names: Vec<_> = all.iter().map(|o| o.details.customer_name.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);

        let page = store.list(OrderQuery::new().limit(1).offset(1)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].details.customer_name, "B");
    }

    #[tokio::test]
    async fn apply_event_updates_matching_order_only() {
        let store = InMemoryOrderStore::new();
        let target = store.insert(details("A", Some("pi_a"))).await.unwrap();
        let other = store.insert(details("B", Some("pi_b"))).await.unwrap();

        let update = store
            .apply_payment_event(&PaymentIntentId::from("pi_a"), &PaymentEvent::Failed)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(update.transition, Transition::Applied);
        assert_eq!(update.order.id, target.id);
        let stored = store.get(target.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_status(), PaymentStatus::Failed);
        let untouched = store.get(other.id).await.unwrap().unwrap();
        assert_eq!(untouched, other);
    }

    #[tokio::test]
    async fn apply_event_without_match_is_none() {
        let store = InMemoryOrderStore::new();
        store.insert(details("A", Some("pi_a"))).await.unwrap();

        let update = store
            .apply_payment_event(&PaymentIntentId::from("pi_zzz"), &PaymentEvent::Failed)
            .await
            .unwrap();
        assert!(update.is_none());
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn find_by_payment_intent_prefers_earliest_order() {
        let store = InMemoryOrderStore::new();
        let first = store.insert(details("A", Some("pi_dup"))).await.unwrap();
        store.insert(details("B", Some("pi_dup"))).await.unwrap();

        let found = store
            .find_by_payment_intent(&PaymentIntentId::from("pi_dup"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);
    }
}
