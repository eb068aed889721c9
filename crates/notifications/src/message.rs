use std::fmt;

use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{Order, OrderDetails};

/// A rendered email ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// How an order is referred to in notifications.
///
/// Orders that could not be persisted have no identifier and are shown as `N/A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderRef {
    Stored(OrderId),
    Unsaved,
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderRef::Stored(id) => write!(f, "{id}"),
            OrderRef::Unsaved => f.write_str("N/A"),
        }
    }
}

/// Everything the dispatcher needs to describe an order.
#[derive(Debug, Clone)]
pub struct OrderNotice {
    pub reference: OrderRef,
    pub details: OrderDetails,
    pub received_at: DateTime<Utc>,
}

impl OrderNotice {
    /// Notice for an order that was persisted.
    pub fn stored(order: &Order) -> Self {
        Self {
            reference: OrderRef::Stored(order.id),
            details: order.details.clone(),
            received_at: order.created_at,
        }
    }

    /// Notice for an order the store could not record.
    pub fn unsaved(details: OrderDetails) -> Self {
        Self {
            reference: OrderRef::Unsaved,
            details,
            received_at: Utc::now(),
        }
    }
}

/// Shop identity shown in customer-facing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopProfile {
    pub name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
}

impl Default for ShopProfile {
    fn default() -> Self {
        Self {
            name: "V.A.Y Studio".to_string(),
            contact_email: "orders@vay-flowers.com".to_string(),
            contact_phone: "734-858-8724".to_string(),
            address: "2410 N 77th AVE, Elmwood Park, IL".to_string(),
        }
    }
}
