//! Email delivery transports.

mod memory;
mod resend;
mod smtp;

use async_trait::async_trait;

pub use memory::InMemoryTransport;
pub use resend::{RESEND_API_URL, ResendTransport};
pub use smtp::{SmtpSecurity, SmtpSettings, SmtpTransport};

use crate::{EmailMessage, Result};

/// A channel capable of delivering a rendered email.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Short name used in logs and metrics.
    fn name(&self) -> &'static str;

    async fn send(&self, message: &EmailMessage) -> Result<()>;
}
