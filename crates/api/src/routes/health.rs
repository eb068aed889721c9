//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use order_store::OrderStore;
use payments::PaymentGateway;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
}

/// GET /health — liveness probe.
pub async fn check<S, G>(State(state): State<Arc<AppState<S, G>>>) -> Json<HealthResponse>
where
    S: OrderStore + Clone + 'static,
    G: PaymentGateway + 'static,
{
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        environment: state.environment.clone(),
    })
}
