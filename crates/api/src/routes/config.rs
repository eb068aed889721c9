//! Public client configuration.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use order_store::OrderStore;
use payments::PaymentGateway;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfigResponse {
    pub stripe_publishable_key: String,
}

/// GET /api/config — the gateway's publishable key for the checkout page.
pub async fn get<S, G>(State(state): State<Arc<AppState<S, G>>>) -> Json<PublicConfigResponse>
where
    S: OrderStore + Clone + 'static,
    G: PaymentGateway + 'static,
{
    Json(PublicConfigResponse {
        stripe_publishable_key: state.publishable_key.clone(),
    })
}
