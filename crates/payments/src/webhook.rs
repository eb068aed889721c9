//! Verification and decoding of signed gateway webhook deliveries.
//!
//! The signature header has the form `t=<unix seconds>,v1=<hex>[,v1=<hex>...]`, where each
//! `v1` value is an HMAC-SHA256 of `"<t>.<raw body>"` keyed with the endpoint secret.

use chrono::Utc;
use common::PaymentIntentId;
use domain::PaymentEvent;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::{GatewayError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum age of a signed delivery, in seconds.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// A verified gateway event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// Event types the order service acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PaymentIntentSucceeded,
    PaymentIntentFailed,
    Other,
}

impl WebhookEvent {
    pub fn kind(&self) -> EventKind {
        match self.event_type.as_str() {
            "payment_intent.succeeded" => EventKind::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => EventKind::PaymentIntentFailed,
            _ => EventKind::Other,
        }
    }

    /// Maps a payment intent event to the intent it concerns and the domain event to apply.
    ///
    /// Returns `None` for event types the order service ignores, or when the event object
    /// carries no intent id.
    pub fn payment_event(&self) -> Option<(PaymentIntentId, PaymentEvent)> {
        let object = &self.data.object;
        let intent_id = object.get("id")?.as_str()?;

        let event = match self.kind() {
            EventKind::PaymentIntentSucceeded => PaymentEvent::Succeeded {
                charge_id: object
                    .get("latest_charge")
                    .and_then(|c| c.as_str())
                    .map(str::to_string),
            },
            EventKind::PaymentIntentFailed => PaymentEvent::Failed,
            EventKind::Other => return None,
        };

        Some((PaymentIntentId::from(intent_id), event))
    }
}

/// Verifies a webhook delivery against the current time and decodes it.
pub fn verify_webhook(payload: &[u8], signature_header: &str, secret: &str) -> Result<WebhookEvent> {
    verify_webhook_at(
        payload,
        signature_header,
        secret,
        Utc::now().timestamp(),
        DEFAULT_TOLERANCE_SECS,
    )
}

/// Verifies a webhook delivery as of `now` (unix seconds) and decodes it.
///
/// Nothing in the payload is parsed before the signature has been checked.
pub fn verify_webhook_at(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<WebhookEvent> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(GatewayError::InvalidSignature(
        "missing or malformed timestamp",
    ))?;
    if signatures.is_empty() {
        return Err(GatewayError::InvalidSignature("no v1 signature"));
    }

    let mac = signed_payload_mac(payload, secret, timestamp)?;
    let matched = signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err(GatewayError::InvalidSignature(
            "no signature matches the payload",
        ));
    }

    if timestamp < now - tolerance_secs {
        return Err(GatewayError::InvalidSignature(
            "timestamp outside the tolerance zone",
        ));
    }

    Ok(serde_json::from_slice(payload)?)
}

/// Builds a valid signature header for `payload`, as the gateway would send it.
pub fn signature_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let signature = signed_payload_mac(payload, secret, timestamp)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default();
    format!("t={timestamp},v1={signature}")
}

fn signed_payload_mac(payload: &[u8], secret: &str, timestamp: i64) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| GatewayError::InvalidSignature("unusable webhook secret"))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}
