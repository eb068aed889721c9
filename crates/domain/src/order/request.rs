//! Incoming order confirmation request.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{LineItem, OrderDetails, OrderError, PaymentMethod};

/// Raw confirmation request as submitted by the checkout page.
///
/// Every field is optional at the wire level so that missing fields can be reported together
/// instead of failing on the first one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmOrderRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_date: Option<String>,
    pub delivery_time: Option<String>,
    pub items: Option<Vec<LineItem>>,
    pub total_amount: Option<Decimal>,
    pub payment_method: Option<String>,
    pub payment_intent_id: Option<String>,
    pub notes: Option<String>,
}

impl ConfirmOrderRequest {
    /// Validates the request and builds the order it describes.
    ///
    /// The initial payment status is derived from the payment method.
    pub fn validate(self) -> Result<OrderDetails, OrderError> {
        let mut missing = Vec::new();
        if self.customer_name.is_none() {
            missing.push("customer_name");
        }
        if self.customer_phone.is_none() {
            missing.push("customer_phone");
        }
        if self.delivery_address.is_none() {
            missing.push("delivery_address");
        }
        if self.delivery_date.is_none() {
            missing.push("delivery_date");
        }
        if self.delivery_time.is_none() {
            missing.push("delivery_time");
        }
        if self.items.is_none() {
            missing.push("items");
        }
        if self.total_amount.is_none() {
            missing.push("total_amount");
        }
        if self.payment_method.is_none() {
            missing.push("payment_method");
        }

        let (
            Some(customer_name),
            Some(customer_phone),
            Some(delivery_address),
            Some(delivery_date),
            Some(delivery_time),
            Some(items),
            Some(total_amount),
            Some(payment_method),
        ) = (
            self.customer_name,
            self.customer_phone,
            self.delivery_address,
            self.delivery_date,
            self.delivery_time,
            self.items,
            self.total_amount,
            self.payment_method,
        )
        else {
            return Err(OrderError::MissingFields(missing));
        };

        let payment_method: PaymentMethod = payment_method.parse()?;

        if let Some(item) = items.iter().find(|item| item.price.is_sign_negative()) {
            return Err(OrderError::NegativePrice {
                product: item.product.clone(),
            });
        }
        if total_amount.is_sign_negative() {
            return Err(OrderError::NegativeTotal);
        }

        Ok(OrderDetails {
            customer_name,
            customer_phone,
            customer_email: non_empty(self.customer_email),
            delivery_address,
            delivery_date,
            delivery_time,
            items,
            total_amount,
            payment_method,
            payment_status: payment_method.initial_status(),
            payment_intent_id: non_empty(self.payment_intent_id).map(Into::into),
            notes: non_empty(self.notes),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaymentStatus;
    use rust_decimal_macros::dec;

    fn jane_doe(method: &str) -> ConfirmOrderRequest {
        serde_json::from_value(serde_json::json!({
            "customer_name": "Jane Doe",
            "customer_phone": "555-0100",
            "delivery_address": "1 Main St",
            "delivery_date": "2026-03-01",
            "delivery_time": "14:00",
            "items": [{"product": "Rose Bouquet", "price": 45.00}],
            "total_amount": 45.00,
            "payment_method": method,
        }))
        .unwrap()
    }

    #[test]
    fn cash_order_starts_pending() {
        let details = jane_doe("cash").validate().unwrap();
        assert_eq!(details.payment_status, PaymentStatus::Pending);
        assert_eq!(details.payment_method, PaymentMethod::Cash);
        assert_eq!(details.total_amount, dec!(45.00));
        assert_eq!(details.items.len(), 1);
        assert_eq!(details.customer_email, None);
    }

    #[test]
    fn card_order_starts_succeeded() {
        let details = jane_doe("card").validate().unwrap();
        assert_eq!(details.payment_status, PaymentStatus::Succeeded);
    }

    #[test]
    fn missing_fields_are_all_named() {
        let mut request = jane_doe("cash");
        request.customer_phone = None;
        request.items = None;
        request.payment_method = None;

        let err = request.validate().unwrap_err();
        assert_eq!(
            err,
            OrderError::MissingFields(vec!["customer_phone", "items", "payment_method"])
        );
        assert_eq!(
            err.to_string(),
            "Missing required fields: customer_phone, items, payment_method"
        );
    }

    #[test]
    fn empty_request_names_every_required_field() {
        let err = ConfirmOrderRequest::default().validate().unwrap_err();
        let OrderError::MissingFields(fields) = err else {
            panic!("expected missing fields");
        };
        assert_eq!(fields.len(), 8);
    }

    #[test]
    fn unknown_payment_method_is_rejected() {
        assert_eq!(
            jane_doe("bitcoin").validate().unwrap_err(),
            OrderError::UnknownPaymentMethod("bitcoin".to_string())
        );
    }

    #[test]
    fn negative_item_price_is_rejected() {
        let mut request = jane_doe("cash");
        request.items = Some(vec![LineItem::new("Refund Hack", dec!(-1))]);
        assert!(matches!(
            request.validate(),
            Err(OrderError::NegativePrice { .. })
        ));
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let mut request = jane_doe("card");
        request.customer_email = Some(String::new());
        request.payment_intent_id = Some("pi_abc".to_string());
        request.notes = Some("  ".to_string());

        let details = request.validate().unwrap();
        assert_eq!(details.customer_email, None);
        assert_eq!(details.notes, None);
        assert_eq!(
            details.payment_intent_id.as_ref().map(|id| id.as_str()),
            Some("pi_abc")
        );
    }
}
