//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p order-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use domain::{
    LineItem, OrderDetails, PaymentEvent, PaymentMethod, PaymentStatus, Transition,
};
use order_store::{OrderId, OrderQuery, OrderStore, PaymentIntentId, PostgresOrderStore};
use rust_decimal_macros::dec;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresOrderStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and an emptied table
async fn get_test_store() -> PostgresOrderStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE orders RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();

    PostgresOrderStore::new(pool)
}

fn order_details(name: &str, method: PaymentMethod, intent: Option<&str>) -> OrderDetails {
    OrderDetails {
        customer_name: name.to_string(),
        customer_phone: "555-0100".to_string(),
        customer_email: Some("jane@example.com".to_string()),
        delivery_address: "1 Main St".to_string(),
        delivery_date: "2026-03-01".to_string(),
        delivery_time: "14:00".to_string(),
        items: vec![
            LineItem::new("Rose Bouquet", dec!(45.00)).with_addon("Teddy Bear"),
            LineItem::new("Greeting Card", dec!(4.99)),
        ],
        total_amount: dec!(49.99),
        payment_method: method,
        payment_status: method.initial_status(),
        payment_intent_id: intent.map(PaymentIntentId::from),
        notes: Some("Leave at the door".to_string()),
    }
}

#[tokio::test]
async fn insert_and_get_roundtrips_every_field() {
    let store = get_test_store().await;
    let details = order_details("Jane Doe", PaymentMethod::Card, Some("pi_1"));

    let inserted = store.insert(details.clone()).await.unwrap();
    assert!(inserted.id.as_i64() > 0);
    assert_eq!(inserted.details, details);
    assert_eq!(inserted.charge_id, None);
    assert_eq!(inserted.created_at, inserted.updated_at);

    let fetched = store.get(inserted.id).await.unwrap().unwrap();
    assert_eq!(fetched, inserted);
}

#[tokio::test]
async fn get_unknown_id_returns_none() {
    let store = get_test_store().await;
    assert!(store.get(OrderId::new(424_242)).await.unwrap().is_none());
}

#[tokio::test]
async fn list_returns_most_recent_first() {
    let store = get_test_store().await;
    let first = store
        .insert(order_details("First", PaymentMethod::Cash, None))
        .await
        .unwrap();
    let second = store
        .insert(order_details("Second", PaymentMethod::Zelle, None))
        .await
        .unwrap();

    let page = store.list(OrderQuery::new().limit(1)).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, second.id);

    let all = store.list(OrderQuery::new()).await.unwrap();
    let ids: Vec<_> = all.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let skipped = store.list(OrderQuery::new().offset(1)).await.unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].id, first.id);
}

#[tokio::test]
async fn payment_event_updates_status_and_charge() {
    let store = get_test_store().await;
    let order = store
        .insert(order_details("Jane Doe", PaymentMethod::Cash, Some("pi_cash")))
        .await
        .unwrap();
    assert_eq!(order.payment_status(), PaymentStatus::Pending);

    let intent = PaymentIntentId::from("pi_cash");
    let event = PaymentEvent::Succeeded {
        charge_id: Some("ch_1".to_string()),
    };

    let update = store
        .apply_payment_event(&intent, &event)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(update.transition, Transition::Applied);
    assert!(update.order.updated_at >= order.updated_at);

    let again = store
        .apply_payment_event(&intent, &event)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.transition, Transition::Unchanged);

    let stored = store.get(order.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status(), PaymentStatus::Succeeded);
    assert_eq!(stored.charge_id.as_deref(), Some("ch_1"));

    let found = store.find_by_payment_intent(&intent).await.unwrap().unwrap();
    assert_eq!(found.id, order.id);
}

#[tokio::test]
async fn payment_event_for_unknown_intent_writes_nothing() {
    let store = get_test_store().await;
    let order = store
        .insert(order_details("Jane Doe", PaymentMethod::Card, Some("pi_known")))
        .await
        .unwrap();

    let update = store
        .apply_payment_event(&PaymentIntentId::from("pi_unknown"), &PaymentEvent::Failed)
        .await
        .unwrap();
    assert!(update.is_none());

    let stored = store.get(order.id).await.unwrap().unwrap();
    assert_eq!(stored, order);
    assert_eq!(store.list(OrderQuery::new()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn stale_failure_does_not_downgrade_confirmed_payment() {
    let store = get_test_store().await;
    let order = store
        .insert(order_details("Jane Doe", PaymentMethod::Card, Some("pi_card")))
        .await
        .unwrap();
    let intent = PaymentIntentId::from("pi_card");

    store
        .apply_payment_event(
            &intent,
            &PaymentEvent::Succeeded {
                charge_id: Some("ch_card".to_string()),
            },
        )
        .await
        .unwrap();
    let update = store
        .apply_payment_event(&intent, &PaymentEvent::Failed)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(update.transition, Transition::Stale);
    let stored = store.get(order.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status(), PaymentStatus::Succeeded);
}
