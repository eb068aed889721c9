//! The order record.

use chrono::{DateTime, Utc};
use common::{OrderId, PaymentIntentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LineItem, PaymentMethod, PaymentStatus};

/// Everything known about an order before the store assigns it an identity.
///
/// Built from a validated confirmation request. The notification dispatcher renders from this
/// type directly, so it works for orders that never reached the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub delivery_address: String,
    pub delivery_date: String,
    pub delivery_time: String,
    pub items: Vec<LineItem>,
    /// Client-submitted total in major currency units.
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub payment_intent_id: Option<PaymentIntentId>,
    pub notes: Option<String>,
}

impl OrderDetails {
    /// Serializes the line items into the opaque blob the store persists.
    pub fn items_blob(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.items)
    }

    /// Rehydrates line items from a stored blob.
    pub fn items_from_blob(blob: &str) -> serde_json::Result<Vec<LineItem>> {
        serde_json::from_str(blob)
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(flatten)]
    pub details: OrderDetails,
    pub charge_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A payment outcome reported by the gateway for the order's payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    Succeeded { charge_id: Option<String> },
    Failed,
}

/// Result of applying a [`PaymentEvent`] to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The order changed.
    Applied,
    /// The order already reflected the event.
    Unchanged,
    /// A failure reported after the gateway confirmed success; ignored.
    Stale,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Applied => "applied",
            Transition::Unchanged => "unchanged",
            Transition::Stale => "stale",
        }
    }
}

impl Order {
    /// Creates the persisted view of `details` with its store-assigned identity.
    pub fn new(id: OrderId, details: OrderDetails, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            details,
            charge_id: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.details.payment_status
    }

    /// Applies a gateway payment event.
    ///
    /// Last write wins, with one exception: once a `succeeded` event has recorded a charge
    /// id, a later failure for the same intent is stale and does not downgrade the order.
    pub fn apply_payment_event(&mut self, event: &PaymentEvent, at: DateTime<Utc>) -> Transition {
        match event {
            PaymentEvent::Succeeded { charge_id } => {
                let charge_id = charge_id.clone().or_else(|| self.charge_id.clone());
                if self.details.payment_status == PaymentStatus::Succeeded
                    && self.charge_id == charge_id
                {
                    return Transition::Unchanged;
                }
                self.details.payment_status = PaymentStatus::Succeeded;
                self.charge_id = charge_id;
            }
            PaymentEvent::Failed => match self.details.payment_status {
                PaymentStatus::Failed => return Transition::Unchanged,
                PaymentStatus::Succeeded if self.charge_id.is_some() => return Transition::Stale,
                _ => self.details.payment_status = PaymentStatus::Failed,
            },
        }
        self.updated_at = at;
        Transition::Applied
    }
}
