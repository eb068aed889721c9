use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::EmailTransport;
use crate::{EmailMessage, NotificationError, Result};

pub const RESEND_API_URL: &str = "https://api.resend.com/emails";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Transactional email API transport.
pub struct ResendTransport {
    client: Client,
    api_key: SecretString,
    from: String,
    endpoint: String,
}

impl ResendTransport {
    pub fn new(api_key: SecretString, from: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            from: from.into(),
            endpoint: RESEND_API_URL.to_string(),
        })
    }

    /// Points the transport at a different API endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Status codes the email API uses for a message it has queued.
fn is_accepted(status: u16) -> bool {
    matches!(status, 200 | 201 | 202)
}

#[async_trait]
impl EmailTransport for ResendTransport {
    fn name(&self) -> &'static str {
        "resend"
    }

    #[tracing::instrument(skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let body = SendEmailBody {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if is_accepted(status) {
            tracing::debug!(status, "Email accepted by API");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotificationError::Rejected { status, body })
    }
}
