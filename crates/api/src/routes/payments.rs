//! Payment intent creation.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::{SecondsFormat, Utc};
use order_store::OrderStore;
use payments::{IntentMetadata, PaymentGateway};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

const CURRENCY: &str = "usd";

#[derive(Deserialize)]
pub struct CreatePaymentIntentRequest {
    pub amount: Option<Decimal>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_date: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
}

/// POST /api/create-payment-intent — start a card payment for `amount` dollars.
#[tracing::instrument(skip(state, body))]
pub async fn create_intent<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    body: Result<Json<CreatePaymentIntentRequest>, JsonRejection>,
) -> Result<Json<CreatePaymentIntentResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    G: PaymentGateway + 'static,
{
    let Json(req) = body?;

    let amount = req
        .amount
        .ok_or_else(|| ApiError::BadRequest("Amount is required".to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(ApiError::BadRequest(
            "Amount must be greater than 0".to_string(),
        ));
    }

    let mut metadata = IntentMetadata::new();
    metadata.insert(
        "customer_name".to_string(),
        req.customer_name.unwrap_or_default(),
    );
    metadata.insert(
        "customer_phone".to_string(),
        req.customer_phone.unwrap_or_default(),
    );
    metadata.insert(
        "delivery_date".to_string(),
        req.delivery_date.unwrap_or_default(),
    );
    metadata.insert(
        "order_timestamp".to_string(),
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    );

    let intent = state
        .gateway
        .create_intent(amount, CURRENCY, metadata)
        .await?;

    tracing::info!(payment_intent_id = %intent.id, "payment intent created");
    metrics::counter!("payment_intents_created_total").increment(1);

    Ok(Json(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
        payment_intent_id: intent.id.to_string(),
    }))
}
