use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::message::{EmailMessage, OrderNotice, ShopProfile};
use crate::render::{customer_confirmation, owner_notification};
use crate::transport::EmailTransport;

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Owner,
    Customer,
}

impl Recipient {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recipient::Owner => "owner",
            Recipient::Customer => "customer",
        }
    }
}

/// Which transport, if any, delivered a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Primary,
    Fallback,
    Failed,
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        !matches!(self, Delivery::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Delivery::Primary => "primary",
            Delivery::Fallback => "fallback",
            Delivery::Failed => "failed",
        }
    }
}

/// Outcome of notifying about one order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotificationReport {
    pub owner_sent: bool,
    pub customer_sent: bool,
}

/// Renders order notifications and delivers them, primary transport first.
#[derive(Clone)]
pub struct NotificationDispatcher {
    primary: Option<Arc<dyn EmailTransport>>,
    fallback: Option<Arc<dyn EmailTransport>>,
    owner_email: String,
    profile: ShopProfile,
}

impl NotificationDispatcher {
    /// Creates a dispatcher with no transports configured.
    pub fn new(owner_email: impl Into<String>, profile: ShopProfile) -> Self {
        Self {
            primary: None,
            fallback: None,
            owner_email: owner_email.into(),
            profile,
        }
    }

    pub fn with_primary(mut self, transport: Arc<dyn EmailTransport>) -> Self {
        self.primary = Some(transport);
        self
    }

    pub fn with_fallback(mut self, transport: Arc<dyn EmailTransport>) -> Self {
        self.fallback = Some(transport);
        self
    }

    /// Sends the owner alert and, when the order has an email, the customer confirmation.
    ///
    /// The two messages are delivered concurrently and independently: a failure on one never
    /// prevents the other. Failures are logged and reported, never returned.
    #[tracing::instrument(skip(self, notice), fields(order = %notice.reference))]
    pub async fn notify(&self, notice: &OrderNotice) -> NotificationReport {
        let owner = async {
            match owner_notification(notice, &self.profile, &self.owner_email) {
                Ok(message) => self.deliver(Recipient::Owner, &message).await.is_sent(),
                Err(e) => {
                    warn!(error = %e, "Failed to render owner notification");
                    false
                }
            }
        };

        let customer = async {
            match customer_confirmation(notice, &self.profile) {
                Ok(Some(message)) => self.deliver(Recipient::Customer, &message).await.is_sent(),
                Ok(None) => false,
                Err(e) => {
                    warn!(error = %e, "Failed to render customer confirmation");
                    false
                }
            }
        };

        let (owner_sent, customer_sent) = tokio::join!(owner, customer);
        NotificationReport {
            owner_sent,
            customer_sent,
        }
    }

    /// Delivers one message, trying the fallback transport when the primary is absent or fails.
    pub async fn deliver(&self, recipient: Recipient, message: &EmailMessage) -> Delivery {
        let delivery = self.try_transports(message).await;

        metrics::counter!(
            "notifications_total",
            "recipient" => recipient.as_str(),
            "outcome" => delivery.as_str()
        )
        .increment(1);

        match delivery {
            Delivery::Failed => warn!(
                recipient = recipient.as_str(),
                "Notification could not be delivered"
            ),
            _ => info!(
                recipient = recipient.as_str(),
                via = delivery.as_str(),
                "Notification delivered"
            ),
        }
        delivery
    }

    async fn try_transports(&self, message: &EmailMessage) -> Delivery {
        if let Some(primary) = &self.primary {
            match primary.send(message).await {
                Ok(()) => return Delivery::Primary,
                Err(e) => warn!(
                    transport = primary.name(),
                    error = %e,
                    "Primary transport failed, falling back"
                ),
            }
        }

        if let Some(fallback) = &self.fallback {
            match fallback.send(message).await {
                Ok(()) => return Delivery::Fallback,
                Err(e) => warn!(
                    transport = fallback.name(),
                    error = %e,
                    "Fallback transport failed"
                ),
            }
        }

        Delivery::Failed
    }
}
