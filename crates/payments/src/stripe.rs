//! Stripe implementation of the payment gateway.

use std::time::Duration;

use async_trait::async_trait;
use common::PaymentIntentId;
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::amount::to_minor_units;
use crate::gateway::{CreatedIntent, IntentMetadata, PaymentGateway, PaymentIntent, Refund};
use crate::{GatewayError, Result};

const DEFAULT_BASE_URL: &str = "https://api.stripe.com/v1";

/// Timeout applied to every call to the provider.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Stripe REST API client.
pub struct StripeGateway {
    client: Client,
    secret_key: SecretString,
    base_url: String,
}

impl StripeGateway {
    /// Creates a client with the default timeout.
    pub fn new(secret_key: SecretString) -> Result<Self> {
        Self::with_timeout(secret_key, DEFAULT_TIMEOUT)
    }

    /// Creates a client whose requests give up after `timeout`.
    pub fn with_timeout(secret_key: SecretString, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            secret_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Points the client at a different API root, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(self.secret_key.expose_secret())
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(self.secret_key.expose_secret())
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StripeErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.message)
            .unwrap_or(body);

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::IntentNotFound(message));
        }
        Err(GatewayError::Provider {
            status: status.as_u16(),
            message,
        })
    }
}

/// Builds the form fields of a create-intent call.
fn intent_form(minor_amount: i64, currency: &str, metadata: &IntentMetadata) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_string(), minor_amount.to_string()),
        ("currency".to_string(), currency.to_string()),
        (
            "automatic_payment_methods[enabled]".to_string(),
            "true".to_string(),
        ),
    ];
    form.extend(
        metadata
            .iter()
            .map(|(key, value)| (format!("metadata[{key}]"), value.clone())),
    );
    form
}

fn positive_minor_units(amount: Decimal) -> Result<i64> {
    match to_minor_units(amount) {
        Some(minor) if minor > 0 => Ok(minor),
        _ => Err(GatewayError::InvalidAmount(amount)),
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[tracing::instrument(skip(self, metadata))]
    async fn create_intent(
        &self,
        amount: Decimal,
        currency: &str,
        metadata: IntentMetadata,
    ) -> Result<CreatedIntent> {
        let minor = positive_minor_units(amount)?;

        let response = self
            .post("/payment_intents")
            .form(&intent_form(minor, currency, &metadata))
            .send()
            .await?;
        let intent: PaymentIntent = Self::parse(response).await?;

        let client_secret = intent.client_secret.ok_or_else(|| GatewayError::Provider {
            status: 200,
            message: "payment intent returned without a client secret".to_string(),
        })?;

        tracing::info!(payment_intent_id = %intent.id, amount_minor = minor, "payment intent created");
        Ok(CreatedIntent {
            id: intent.id,
            client_secret,
        })
    }

    async fn retrieve_intent(&self, id: &PaymentIntentId) -> Result<PaymentIntent> {
        let response = self.get(&format!("/payment_intents/{id}")).send().await?;
        Self::parse(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_intent(&self, id: &PaymentIntentId) -> Result<PaymentIntent> {
        let response = self
            .post(&format!("/payment_intents/{id}/cancel"))
            .send()
            .await?;
        Self::parse(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn create_refund(
        &self,
        id: &PaymentIntentId,
        amount: Option<Decimal>,
    ) -> Result<Refund> {
        let mut form = vec![("payment_intent".to_string(), id.to_string())];
        if let Some(amount) = amount {
            form.push(("amount".to_string(), positive_minor_units(amount)?.to_string()));
        }

        let response = self.post("/refunds").form(&form).send().await?;
        Self::parse(response).await
    }
}
