//! Order notification emails.
//!
//! The dispatcher renders the owner and customer messages for an order and delivers each one
//! through a primary transport, falling back to a secondary transport when the primary fails.

mod dispatcher;
mod error;
mod message;
mod render;
pub mod transport;

pub use dispatcher::{Delivery, NotificationDispatcher, NotificationReport, Recipient};
pub use error::{NotificationError, Result};
pub use message::{EmailMessage, OrderNotice, OrderRef, ShopProfile};
pub use render::{customer_confirmation, owner_notification};
pub use transport::{
    EmailTransport, InMemoryTransport, ResendTransport, SmtpSecurity, SmtpSettings,
    SmtpTransport,
};
