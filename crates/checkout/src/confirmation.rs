//! Order confirmation workflow.

use std::time::Instant;

use common::OrderId;
use domain::{ConfirmOrderRequest, Order, OrderDetails};
use notifications::{NotificationDispatcher, NotificationReport, OrderNotice};
use order_store::{OrderStore, StoreError};
use tracing::{error, info, warn};

use crate::error::{CheckoutError, Result};
use crate::task::NotificationTask;

/// Result of the single write attempted for an order.
#[derive(Debug)]
pub enum PersistOutcome {
    Persisted(Order),
    PersistFailed {
        details: OrderDetails,
        error: StoreError,
    },
}

/// Successful outcome of a confirmation.
#[derive(Debug)]
pub enum Confirmation {
    /// The order was stored; its notifications are being delivered in the background.
    Confirmed {
        order: Order,
        notification: NotificationTask,
    },
    /// The order could not be stored, but the owner was notified by email.
    Degraded { report: NotificationReport },
}

impl Confirmation {
    /// The stored order's id, or `None` when the order only exists as an email.
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            Confirmation::Confirmed { order, .. } => Some(order.id),
            Confirmation::Degraded { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Confirmation::Degraded { .. })
    }

    pub fn message(&self) -> &'static str {
        match self {
            Confirmation::Confirmed { .. } => "Order confirmed successfully",
            Confirmation::Degraded { .. } => {
                "Order received. It could not be saved, but the shop has been notified by email."
            }
        }
    }
}

/// Validates, records and announces incoming orders.
pub struct OrderConfirmation<S>
where
    S: OrderStore,
{
    store: S,
    dispatcher: NotificationDispatcher,
}

impl<S> OrderConfirmation<S>
where
    S: OrderStore,
{
    pub fn new(store: S, dispatcher: NotificationDispatcher) -> Self {
        Self { store, dispatcher }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Confirms an order.
    ///
    /// A stored order is acknowledged immediately and its notifications are delivered in the
    /// background. When the write fails, notifications are sent before returning, with the
    /// order shown as `N/A`; the confirmation is degraded if the owner received it and fails
    /// with [`CheckoutError::Unrecorded`] otherwise.
    #[tracing::instrument(skip(self, request))]
    pub async fn confirm(&self, request: ConfirmOrderRequest) -> Result<Confirmation> {
        let started = Instant::now();
        let details = request.validate()?;

        let result = match self.persist(details).await {
            PersistOutcome::Persisted(order) => {
                info!(order_id = %order.id, "Order persisted");
                metrics::counter!("orders_confirmed_total").increment(1);

                let notification =
                    NotificationTask::spawn(self.dispatcher.clone(), OrderNotice::stored(&order));
                Ok(Confirmation::Confirmed {
                    order,
                    notification,
                })
            }
            PersistOutcome::PersistFailed { details, error } => {
                self.notify_unsaved(details, error).await
            }
        };

        metrics::histogram!("order_confirmation_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        result
    }

    /// Attempts the single write for an order.
    pub async fn persist(&self, details: OrderDetails) -> PersistOutcome {
        match self.store.insert(details.clone()).await {
            Ok(order) => PersistOutcome::Persisted(order),
            Err(error) => PersistOutcome::PersistFailed { details, error },
        }
    }

    async fn notify_unsaved(&self, details: OrderDetails, error: StoreError) -> Result<Confirmation> {
        error!(
            error = %error,
            customer_name = %details.customer_name,
            "Failed to persist order, notifying synchronously"
        );

        let customer_name = details.customer_name.clone();
        let customer_phone = details.customer_phone.clone();
        let report = self.dispatcher.notify(&OrderNotice::unsaved(details)).await;

        if report.owner_sent {
            warn!(
                customer_sent = report.customer_sent,
                "Order recorded by email only"
            );
            metrics::counter!("orders_degraded_total").increment(1);
            return Ok(Confirmation::Degraded { report });
        }

        error!(
            error = %error,
            customer_name = %customer_name,
            customer_phone = %customer_phone,
            "Order unrecorded: persistence and owner notification both failed"
        );
        metrics::counter!("orders_unrecorded_total").increment(1);
        Err(CheckoutError::Unrecorded { source: error })
    }
}
