//! Reconciliation of stored orders against gateway payment events.

use common::{OrderId, PaymentIntentId};
use domain::{PaymentStatus, Transition};
use order_store::OrderStore;
use payments::{WebhookEvent, verify_webhook};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info, warn};

use crate::error::Result;

/// What a verified webhook delivery did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// An order matched the event's payment intent.
    Updated {
        order_id: OrderId,
        status: PaymentStatus,
        transition: Transition,
    },
    /// No stored order carries the event's payment intent.
    NoMatchingOrder(PaymentIntentId),
    /// The event type is not one the order service acts on.
    Ignored(String),
    /// The matching order could not be updated.
    StoreFailed,
}

impl ReconcileOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::Updated { transition, .. } => transition.as_str(),
            ReconcileOutcome::NoMatchingOrder(_) => "no_matching_order",
            ReconcileOutcome::Ignored(_) => "ignored",
            ReconcileOutcome::StoreFailed => "store_failed",
        }
    }
}

/// Applies signed gateway events to the order they concern.
pub struct WebhookReconciler<S>
where
    S: OrderStore,
{
    store: S,
    webhook_secret: SecretString,
}

impl<S> WebhookReconciler<S>
where
    S: OrderStore,
{
    pub fn new(store: S, webhook_secret: SecretString) -> Self {
        Self {
            store,
            webhook_secret,
        }
    }

    /// Verifies a raw delivery and reconciles it.
    ///
    /// Only a failed verification is an error. Once the event is trusted, every outcome,
    /// including a store failure, is reported as a successful delivery.
    #[tracing::instrument(skip_all)]
    pub async fn handle(&self, payload: &[u8], signature: &str) -> Result<ReconcileOutcome> {
        let event = match verify_webhook(payload, signature, self.webhook_secret.expose_secret()) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Webhook signature verification failed");
                metrics::counter!(
                    "webhook_events_total",
                    "event_type" => "unverified",
                    "outcome" => "rejected"
                )
                .increment(1);
                return Err(e.into());
            }
        };

        let outcome = self.reconcile(&event).await;
        metrics::counter!(
            "webhook_events_total",
            "event_type" => event.event_type.clone(),
            "outcome" => outcome.as_str()
        )
        .increment(1);
        Ok(outcome)
    }

    /// Applies an already verified event.
    #[tracing::instrument(skip(self, event), fields(event_id = %event.id, event_type = %event.event_type))]
    pub async fn reconcile(&self, event: &WebhookEvent) -> ReconcileOutcome {
        let Some((intent_id, payment_event)) = event.payment_event() else {
            debug!("Ignoring webhook event");
            return ReconcileOutcome::Ignored(event.event_type.clone());
        };

        match self.store.apply_payment_event(&intent_id, &payment_event).await {
            Ok(Some(update)) => {
                let status = update.order.payment_status();
                match update.transition {
                    Transition::Stale => warn!(
                        order_id = %update.order.id,
                        payment_intent_id = %intent_id,
                        status = %status,
                        "Ignoring failure for a payment the gateway already captured"
                    ),
                    _ => info!(
                        order_id = %update.order.id,
                        payment_intent_id = %intent_id,
                        status = %status,
                        transition = update.transition.as_str(),
                        "Order payment status reconciled"
                    ),
                }
                ReconcileOutcome::Updated {
                    order_id: update.order.id,
                    status,
                    transition: update.transition,
                }
            }
            Ok(None) => {
                info!(payment_intent_id = %intent_id, "No order matches payment intent");
                ReconcileOutcome::NoMatchingOrder(intent_id)
            }
            Err(e) => {
                error!(
                    error = %e,
                    payment_intent_id = %intent_id,
                    "Error updating order status"
                );
                ReconcileOutcome::StoreFailed
            }
        }
    }
}
