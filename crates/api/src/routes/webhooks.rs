//! Payment gateway webhook endpoint.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use order_store::OrderStore;
use payments::{PaymentGateway, SIGNATURE_HEADER};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct WebhookResponse {
    pub success: bool,
}

/// POST /webhook/stripe — signed payment events.
///
/// Any verified delivery is acknowledged, including event types that are ignored.
#[tracing::instrument(skip_all)]
pub async fn stripe<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    G: PaymentGateway + 'static,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let outcome = state.reconciler.handle(&body, signature).await?;
    tracing::debug!(?outcome, "webhook processed");

    Ok(Json(WebhookResponse { success: true }))
}
