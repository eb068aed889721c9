//! In-memory payment gateway for tests and local development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::PaymentIntentId;
use rust_decimal::Decimal;

use crate::amount::to_minor_units;
use crate::gateway::{CreatedIntent, IntentMetadata, PaymentGateway, PaymentIntent, Refund};
use crate::{GatewayError, Result};

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    intents: HashMap<PaymentIntentId, (PaymentIntent, IntentMetadata)>,
    refunds: Vec<Refund>,
    next_id: u32,
    fail_requests: bool,
}

/// In-memory payment gateway.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory payment gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to reject every request as the provider would.
    pub fn set_fail_requests(&self, fail: bool) {
        self.state.write().unwrap().fail_requests = fail;
    }

    /// Returns the number of intents created so far.
    pub fn intent_count(&self) -> usize {
        self.state.read().unwrap().intents.len()
    }

    /// Returns the metadata an intent was created with.
    pub fn metadata(&self, id: &PaymentIntentId) -> Option<IntentMetadata> {
        self.state
            .read()
            .unwrap()
            .intents
            .get(id)
            .map(|(_, metadata)| metadata.clone())
    }

    fn check_available(state: &InMemoryGatewayState) -> Result<()> {
        if state.fail_requests {
            return Err(GatewayError::Provider {
                status: 402,
                message: "Your card was declined.".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn create_intent(
        &self,
        amount: Decimal,
        currency: &str,
        metadata: IntentMetadata,
    ) -> Result<CreatedIntent> {
        let minor = match to_minor_units(amount) {
            Some(minor) if minor > 0 => minor,
            _ => return Err(GatewayError::InvalidAmount(amount)),
        };

        let mut state = self.state.write().unwrap();
        Self::check_available(&state)?;

        state.next_id += 1;
        let id = PaymentIntentId::new(format!("pi_test_{:04}", state.next_id));
        let client_secret = format!("{id}_secret_test");
        let intent = PaymentIntent {
            id: id.clone(),
            amount: minor,
            currency: currency.to_string(),
            status: "requires_payment_method".to_string(),
            client_secret: Some(client_secret.clone()),
            latest_charge: None,
        };
        state.intents.insert(id.clone(), (intent, metadata));

        Ok(CreatedIntent { id, client_secret })
    }

    async fn retrieve_intent(&self, id: &PaymentIntentId) -> Result<PaymentIntent> {
        let state = self.state.read().unwrap();
        Self::check_available(&state)?;
        state
            .intents
            .get(id)
            .map(|(intent, _)| intent.clone())
            .ok_or_else(|| GatewayError::IntentNotFound(id.to_string()))
    }

    async fn cancel_intent(&self, id: &PaymentIntentId) -> Result<PaymentIntent> {
        let mut state = self.state.write().unwrap();
        Self::check_available(&state)?;
        let (intent, _) = state
            .intents
            .get_mut(id)
            .ok_or_else(|| GatewayError::IntentNotFound(id.to_string()))?;
        intent.status = "canceled".to_string();
        Ok(intent.clone())
    }

    async fn create_refund(
        &self,
        id: &PaymentIntentId,
        amount: Option<Decimal>,
    ) -> Result<Refund> {
        let mut state = self.state.write().unwrap();
        Self::check_available(&state)?;
        let intent_amount = state
            .intents
            .get(id)
            .map(|(intent, _)| intent.amount)
            .ok_or_else(|| GatewayError::IntentNotFound(id.to_string()))?;

        let refunded = match amount {
            Some(amount) => match to_minor_units(amount) {
                Some(minor) if minor > 0 && minor <= intent_amount => minor,
                _ => return Err(GatewayError::InvalidAmount(amount)),
            },
            None => intent_amount,
        };

        let refund = Refund {
            id: format!("re_test_{:04}", state.refunds.len() + 1),
            amount: refunded,
            status: "succeeded".to_string(),
        };
        state.refunds.push(refund.clone());
        Ok(refund)
    }
}
