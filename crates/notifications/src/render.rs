//! HTML rendering of the owner and customer messages.
//!
//! Values are formatted here and interpolated by the templates, which escape them.

use askama::Template;
use chrono::Datelike;
use domain::LineItem;
use rust_decimal::Decimal;

use crate::Result;
use crate::message::{EmailMessage, OrderNotice, ShopProfile};

struct ItemRow<'a> {
    product: &'a str,
    addons: String,
    price: String,
}

/// HTML template for the shop owner's new-order alert.
#[derive(Template)]
#[template(path = "email/owner_notification.html")]
struct OwnerNotificationHtml<'a> {
    order_number: String,
    customer_name: &'a str,
    customer_phone: &'a str,
    customer_email: &'a str,
    delivery_address: &'a str,
    delivery_date: &'a str,
    delivery_time: &'a str,
    items: Vec<ItemRow<'a>>,
    total: String,
    payment_method: &'a str,
    payment_status: &'a str,
    payment_intent_id: Option<&'a str>,
    notes: Option<&'a str>,
    received_at: String,
}

/// HTML template for the customer's order confirmation.
#[derive(Template)]
#[template(path = "email/customer_confirmation.html")]
struct CustomerConfirmationHtml<'a> {
    shop_name: &'a str,
    shop_address: &'a str,
    contact_email: &'a str,
    contact_phone: &'a str,
    customer_name: &'a str,
    delivery_address: &'a str,
    delivery_date: &'a str,
    delivery_time: &'a str,
    items: Vec<ItemRow<'a>>,
    total: String,
    payment_method: &'a str,
    year: i32,
}

fn money(amount: Decimal) -> String {
    format!("${amount:.2}")
}

fn item_rows(items: &[LineItem]) -> Vec<ItemRow<'_>> {
    items
        .iter()
        .map(|item| ItemRow {
            product: &item.product,
            addons: if item.addons.is_empty() {
                "None".to_string()
            } else {
                item.addons.join(", ")
            },
            price: money(item.price),
        })
        .collect()
}

/// Renders the new-order alert sent to the shop owner.
pub fn owner_notification(
    notice: &OrderNotice,
    profile: &ShopProfile,
    owner_email: &str,
) -> Result<EmailMessage> {
    let details = &notice.details;
    let html = OwnerNotificationHtml {
        order_number: notice.reference.to_string(),
        customer_name: &details.customer_name,
        customer_phone: &details.customer_phone,
        customer_email: details.customer_email.as_deref().unwrap_or("Not provided"),
        delivery_address: &details.delivery_address,
        delivery_date: &details.delivery_date,
        delivery_time: &details.delivery_time,
        items: item_rows(&details.items),
        total: money(details.total_amount),
        payment_method: details.payment_method.label(),
        payment_status: details.payment_status.label(),
        payment_intent_id: details.payment_intent_id.as_ref().map(|id| id.as_str()),
        notes: details.notes.as_deref(),
        received_at: notice
            .received_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
    }
    .render()?;

    Ok(EmailMessage {
        to: owner_email.to_string(),
        subject: format!(
            "\u{1F338} New Order #{} - {}",
            notice.reference, profile.name
        ),
        html,
    })
}

/// Renders the confirmation sent to the customer.
///
/// Returns `None` when the order carries no customer email.
pub fn customer_confirmation(
    notice: &OrderNotice,
    profile: &ShopProfile,
) -> Result<Option<EmailMessage>> {
    let details = &notice.details;
    let Some(to) = details.customer_email.as_deref() else {
        return Ok(None);
    };

    let html = CustomerConfirmationHtml {
        shop_name: &profile.name,
        shop_address: &profile.address,
        contact_email: &profile.contact_email,
        contact_phone: &profile.contact_phone,
        customer_name: &details.customer_name,
        delivery_address: &details.delivery_address,
        delivery_date: &details.delivery_date,
        delivery_time: &details.delivery_time,
        items: item_rows(&details.items),
        total: money(details.total_amount),
        payment_method: details.payment_method.label(),
        year: notice.received_at.year(),
    }
    .render()?;

    Ok(Some(EmailMessage {
        to: to.to_string(),
        subject: format!("Order Confirmation - {}", profile.name),
        html,
    }))
}
