use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use secrecy::{ExposeSecret, SecretString};

use super::EmailTransport;
use crate::{EmailMessage, NotificationError, Result};

/// Port on which the relay expects TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// TLS from the first byte.
    ImplicitTls,
    /// Plain connection upgraded with STARTTLS.
    StartTls,
}

impl SmtpSecurity {
    pub fn for_port(port: u16) -> Self {
        if port == IMPLICIT_TLS_PORT {
            SmtpSecurity::ImplicitTls
        } else {
            SmtpSecurity::StartTls
        }
    }
}

/// SMTP relay settings.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// SMTP transport, authenticating as and sending from the configured user.
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    security: SmtpSecurity,
}

impl SmtpTransport {
    /// Builds the transport.
    ///
    /// No connection is opened until the first message is sent.
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let credentials = Credentials::new(
            settings.username.clone(),
            settings.password.expose_secret().to_string(),
        );

        let security = SmtpSecurity::for_port(settings.port);
        let builder = match security {
            SmtpSecurity::ImplicitTls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?,
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            }
        };

        let mailer = builder
            .port(settings.port)
            .credentials(credentials)
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        let sender = settings
            .username
            .parse::<Mailbox>()
            .map_err(|_| NotificationError::InvalidAddress(settings.username.clone()))?;

        Ok(Self {
            mailer,
            sender,
            security,
        })
    }

    pub fn security(&self) -> SmtpSecurity {
        self.security
    }
}

#[async_trait]
impl EmailTransport for SmtpTransport {
    fn name(&self) -> &'static str {
        "smtp"
    }

    #[tracing::instrument(skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|_| NotificationError::InvalidAddress(message.to.clone()))?;

        let email = Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())?;

        self.mailer.send(email).await?;
        Ok(())
    }
}
