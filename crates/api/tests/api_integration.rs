//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::config::Config;
use api::{AppState, create_app};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use notifications::{InMemoryTransport, NotificationDispatcher, ShopProfile};
use order_store::{InMemoryOrderStore, OrderStore, PaymentIntentId};
use payments::{InMemoryPaymentGateway, SIGNATURE_HEADER, signature_header};
use tower::ServiceExt;

const WEBHOOK_SECRET: &str = "whsec_api_test";
const OWNER: &str = "owner@example.com";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn test_config() -> Config {
    Config::from_lookup(|key| {
        let value = match key {
            "APP_ENV" => "test",
            "STRIPE_PUBLISHABLE_KEY" => "pk_test_123",
            "STRIPE_SECRET_KEY" => "sk_test_123",
            "STRIPE_WEBHOOK_SECRET" => WEBHOOK_SECRET,
            "NOTIFICATION_EMAIL" => OWNER,
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap()
}

struct TestApp {
    router: Router,
    store: InMemoryOrderStore,
    gateway: InMemoryPaymentGateway,
    primary: InMemoryTransport,
    fallback: InMemoryTransport,
}

fn setup() -> TestApp {
    let config = test_config();
    let store = InMemoryOrderStore::new();
    let gateway = InMemoryPaymentGateway::new();
    let primary = InMemoryTransport::new("primary");
    let fallback = InMemoryTransport::new("fallback");
    let dispatcher = NotificationDispatcher::new(OWNER, ShopProfile::default())
        .with_primary(Arc::new(primary.clone()))
        .with_fallback(Arc::new(fallback.clone()));

    let state = Arc::new(AppState::new(
        store.clone(),
        gateway.clone(),
        dispatcher,
        &config,
    ));
    let router = create_app(state, get_metrics_handle(), &config.allowed_origins);

    TestApp {
        router,
        store,
        gateway,
        primary,
        fallback,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn jane_doe(method: &str) -> serde_json::Value {
    serde_json::json!({
        "customer_name": "Jane Doe",
        "customer_phone": "555-0100",
        "delivery_address": "1 Main St",
        "delivery_date": "2026-03-01",
        "delivery_time": "14:00",
        "items": [{"product": "Rose Bouquet", "price": 45.00}],
        "total_amount": 45.00,
        "payment_method": method
    })
}

fn signed_webhook(event_type: &str, intent: &str, secret: &str) -> Request<Body> {
    let payload = serde_json::to_vec(&serde_json::json!({
        "id": "evt_api",
        "type": event_type,
        "data": {"object": {"id": intent, "latest_charge": "ch_api"}}
    }))
    .unwrap();
    let header = signature_header(&payload, secret, Utc::now().timestamp());

    Request::builder()
        .method("POST")
        .uri("/webhook/stripe")
        .header(SIGNATURE_HEADER, header)
        .body(Body::from(payload))
        .unwrap()
}

async fn confirm(app: &TestApp, body: serde_json::Value) -> i64 {
    let (status, json) = send(app, post_json("/api/confirm-order", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    json["order_id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let (status, json) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["environment"], "test");
    assert!(json["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_public_config() {
    let app = setup();

    let (status, json) = send(&app, get("/api/config")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stripePublishableKey"], "pk_test_123");
}

#[tokio::test]
async fn test_create_payment_intent() {
    let app = setup();

    let (status, json) = send(
        &app,
        post_json(
            "/api/create-payment-intent",
            serde_json::json!({"amount": 49.99, "customer_name": "Jane Doe"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let intent_id = json["paymentIntentId"].as_str().unwrap();
    assert!(json["clientSecret"].as_str().unwrap().starts_with(intent_id));

    let metadata = app
        .gateway
        .metadata(&PaymentIntentId::from(intent_id))
        .unwrap();
    assert_eq!(metadata["customer_name"], "Jane Doe");
    assert_eq!(metadata["customer_phone"], "");
    assert!(metadata.contains_key("order_timestamp"));
}

#[tokio::test]
async fn test_create_payment_intent_validates_amount() {
    let app = setup();

    let (status, json) = send(
        &app,
        post_json("/api/create-payment-intent", serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Amount is required");

    let (status, json) = send(
        &app,
        post_json("/api/create-payment-intent", serde_json::json!({"amount": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Amount must be greater than 0");
    assert_eq!(app.gateway.intent_count(), 0);
}

#[tokio::test]
async fn test_create_payment_intent_gateway_failure() {
    let app = setup();
    app.gateway.set_fail_requests(true);

    let (status, json) = send(
        &app,
        post_json("/api/create-payment-intent", serde_json::json!({"amount": 10})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_confirm_cash_order() {
    let app = setup();

    let (status, json) = send(&app, post_json("/api/confirm-order", jane_doe("cash"))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Order confirmed successfully");
    let order_id = json["order_id"].as_i64().unwrap();
    assert!(order_id > 0);

    let (status, order) = send(&app, get(&format!("/api/orders/{order_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["id"], order_id);
    assert_eq!(order["payment_status"], "pending");
    assert_eq!(order["payment_method"], "cash");
    assert_eq!(order["items"][0]["product"], "Rose Bouquet");
    assert_eq!(order["total_amount"], 45.0);
    assert!(order["created_at"].as_str().is_some());
}

#[tokio::test]
async fn test_confirm_card_order_is_succeeded() {
    let app = setup();

    let order_id = confirm(&app, jane_doe("card")).await;

    let (_, order) = send(&app, get(&format!("/api/orders/{order_id}"))).await;
    assert_eq!(order["payment_status"], "succeeded");
}

#[tokio::test]
async fn test_confirm_missing_fields() {
    let app = setup();
    let mut body = jane_doe("cash");
    body.as_object_mut().unwrap().remove("delivery_time");
    body.as_object_mut().unwrap().remove("items");

    let (status, json) = send(&app, post_json("/api/confirm-order", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing required fields: delivery_time, items");
    assert_eq!(app.store.order_count().await, 0);
    assert!(app.primary.sent().is_empty());
}

#[tokio::test]
async fn test_confirm_unknown_payment_method() {
    let app = setup();

    let (status, json) = send(&app, post_json("/api/confirm-order", jane_doe("bitcoin"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("bitcoin"));
}

#[tokio::test]
async fn test_confirm_malformed_body() {
    let app = setup();

    let request = Request::builder()
        .method("POST")
        .uri("/api/confirm-order")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_confirm_degrades_to_email_when_store_fails() {
    let app = setup();
    app.store.set_fail_writes(true).await;

    let (status, json) = send(&app, post_json("/api/confirm-order", jane_doe("cash"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["order_id"], 0);
    assert_eq!(json["notifications"]["owner_sent"], true);
    assert_eq!(app.store.order_count().await, 0);
    assert_eq!(app.primary.sent_to(OWNER).len(), 1);
}

#[tokio::test]
async fn test_confirm_fails_when_nothing_records_the_order() {
    let app = setup();
    app.store.set_fail_writes(true).await;
    app.primary.set_fail(true);
    app.fallback.set_fail(true);

    let (status, json) = send(&app, post_json("/api/confirm-order", jane_doe("cash"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().is_some());
    assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn test_list_orders_most_recent_first() {
    let app = setup();
    let first = confirm(&app, jane_doe("cash")).await;
    let second = confirm(&app, jane_doe("zelle")).await;

    let (status, json) = send(&app, get("/api/orders?limit=1&offset=0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["orders"][0]["id"], second);

    let (_, json) = send(&app, get("/api/orders")).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["orders"][1]["id"], first);
}

#[tokio::test]
async fn test_list_orders_rejects_bad_query() {
    let app = setup();

    let (status, json) = send(&app, get("/api/orders?limit=-5")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_get_nonexistent_order() {
    let app = setup();

    let (status, json) = send(&app, get("/api/orders/9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Order not found");

    let (status, _) = send(&app, get("/api/orders/not-a-number")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_webhook_reconciles_order() {
    let app = setup();
    let mut body = jane_doe("cash");
    body["payment_intent_id"] = serde_json::json!("pi_api");
    let order_id = confirm(&app, body).await;

    for _ in 0..2 {
        let (status, json) = send(
            &app,
            signed_webhook("payment_intent.succeeded", "pi_api", WEBHOOK_SECRET),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
    }

    let (_, order) = send(&app, get(&format!("/api/orders/{order_id}"))).await;
    assert_eq!(order["payment_status"], "succeeded");
    assert_eq!(order["stripe_payment_intent_id"], "pi_api");
    assert_eq!(order["stripe_charge_id"], "ch_api");
}

#[tokio::test]
async fn test_webhook_rejects_bad_signature() {
    let app = setup();
    let mut body = jane_doe("cash");
    body["payment_intent_id"] = serde_json::json!("pi_guarded");
    let order_id = confirm(&app, body).await;

    let (status, json) = send(
        &app,
        signed_webhook("payment_intent.succeeded", "pi_guarded", "whsec_forged"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid signature");
    let order = app
        .store
        .get(order_store::OrderId::new(order_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.charge_id, None);
}

#[tokio::test]
async fn test_webhook_without_signature_header() {
    let app = setup();

    let request = Request::builder()
        .method("POST")
        .uri("/webhook/stripe")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_accepts_unknown_events_and_unknown_intents() {
    let app = setup();

    let (status, _) = send(
        &app,
        signed_webhook("customer.created", "cus_1", WEBHOOK_SECRET),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        signed_webhook("payment_intent.payment_failed", "pi_nobody", WEBHOOK_SECRET),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();

    let response = app.router.clone().oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = setup();

    let (status, json) = send(&app, get("/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Not found");
}
