//! HTTP API server for order confirmation and payment reconciliation.
//!
//! Provides the checkout endpoints, the payment webhook and the order listing,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use payments::PaymentGateway;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::{AppState, build_dispatcher};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, G>(
    state: Arc<AppState<S, G>>,
    metrics_handle: PrometheusHandle,
    allowed_origins: &[String],
) -> Router
where
    S: OrderStore + Clone + 'static,
    G: PaymentGateway + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S, G>))
        .route("/api/config", get(routes::config::get::<S, G>))
        .route(
            "/api/create-payment-intent",
            post(routes::payments::create_intent::<S, G>),
        )
        .route("/api/confirm-order", post(routes::orders::confirm::<S, G>))
        .route("/api/orders", get(routes::orders::list::<S, G>))
        .route("/api/orders/{id}", get(routes::orders::get::<S, G>))
        .route("/webhook/stripe", post(routes::webhooks::stripe::<S, G>))
        .with_state(state)
        .merge(metrics_router)
        .fallback(routes::not_found)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
