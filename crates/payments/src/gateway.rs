//! Payment gateway trait and shared types.

use std::collections::BTreeMap;

use async_trait::async_trait;
use common::PaymentIntentId;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::Result;

/// Key/value metadata attached to a payment intent for tracking.
pub type IntentMetadata = BTreeMap<String, String>;

/// Result of creating a payment intent: what the client needs to complete the payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIntent {
    pub id: PaymentIntentId,
    pub client_secret: String,
}

/// A payment intent as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub id: PaymentIntentId,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub latest_charge: Option<String>,
}

/// A refund issued against a payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Refund {
    pub id: String,
    /// Refunded amount in minor units.
    pub amount: i64,
    pub status: String,
}

/// Operations the order service needs from the payment provider.
///
/// Amounts are in major units on this side of the trait; implementations convert to minor
/// units at the boundary.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a payment intent for `amount`.
    ///
    /// Fails with [`GatewayError::InvalidAmount`](crate::GatewayError::InvalidAmount) when
    /// `amount <= 0`.
    async fn create_intent(
        &self,
        amount: Decimal,
        currency: &str,
        metadata: IntentMetadata,
    ) -> Result<CreatedIntent>;

    /// Retrieves a payment intent.
    async fn retrieve_intent(&self, id: &PaymentIntentId) -> Result<PaymentIntent>;

    /// Cancels a payment intent that has not been captured.
    async fn cancel_intent(&self, id: &PaymentIntentId) -> Result<PaymentIntent>;

    /// Refunds a payment, fully when `amount` is `None`.
    async fn create_refund(&self, id: &PaymentIntentId, amount: Option<Decimal>)
    -> Result<Refund>;
}
