//! Payment gateway adapter.
//!
//! Wraps the external payment provider behind the [`PaymentGateway`] trait, verifies signed
//! webhook deliveries, and converts between major and minor currency units at the boundary.

pub mod amount;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod stripe;
pub mod webhook;

pub use amount::{from_minor_units, to_minor_units};
pub use error::{GatewayError, Result};
pub use gateway::{CreatedIntent, IntentMetadata, PaymentGateway, PaymentIntent, Refund};
pub use memory::InMemoryPaymentGateway;
pub use stripe::StripeGateway;
pub use webhook::{EventKind, SIGNATURE_HEADER, WebhookEvent, signature_header, verify_webhook};
