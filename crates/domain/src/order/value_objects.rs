//! Value objects for the order domain.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderError, PaymentStatus};

/// One purchased product with the add-ons the customer picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: String,
    /// Price in major currency units.
    pub price: Decimal,
    #[serde(default)]
    pub addons: Vec<String>,
}

impl LineItem {
    pub fn new(product: impl Into<String>, price: Decimal) -> Self {
        Self {
            product: product.into(),
            price,
            addons: Vec::new(),
        }
    }

    /// Adds an add-on label to this item.
    pub fn with_addon(mut self, addon: impl Into<String>) -> Self {
        self.addons.push(addon.into());
        self
    }
}

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Zelle,
    Paypal,
    Cash,
}

impl PaymentMethod {
    /// Status an order starts with at confirmation time.
    ///
    /// Card charges are captured client-side before confirmation, so they start `succeeded`.
    pub fn initial_status(&self) -> PaymentStatus {
        match self {
            PaymentMethod::Card => PaymentStatus::Succeeded,
            PaymentMethod::Zelle | PaymentMethod::Paypal | PaymentMethod::Cash => {
                PaymentStatus::Pending
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Zelle => "zelle",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Cash => "cash",
        }
    }

    /// Human-readable label used in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Card",
            PaymentMethod::Zelle => "Zelle",
            PaymentMethod::Paypal => "Paypal",
            PaymentMethod::Cash => "Cash",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "zelle" => Ok(PaymentMethod::Zelle),
            "paypal" => Ok(PaymentMethod::Paypal),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(OrderError::UnknownPaymentMethod(other.to_string())),
        }
    }
}
