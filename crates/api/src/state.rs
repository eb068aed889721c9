//! Shared application state.

use std::sync::Arc;

use checkout::{OrderConfirmation, WebhookReconciler};
use notifications::{
    NotificationDispatcher, ResendTransport, ShopProfile, SmtpSettings, SmtpTransport,
};
use order_store::OrderStore;
use payments::PaymentGateway;

use crate::config::{Config, EmailConfig};

/// Shared application state accessible from all handlers.
pub struct AppState<S, G>
where
    S: OrderStore,
    G: PaymentGateway,
{
    pub store: S,
    pub gateway: G,
    pub confirmation: OrderConfirmation<S>,
    pub reconciler: WebhookReconciler<S>,
    pub environment: String,
    pub publishable_key: String,
}

impl<S, G> AppState<S, G>
where
    S: OrderStore + Clone,
    G: PaymentGateway,
{
    pub fn new(store: S, gateway: G, dispatcher: NotificationDispatcher, config: &Config) -> Self {
        Self {
            confirmation: OrderConfirmation::new(store.clone(), dispatcher),
            reconciler: WebhookReconciler::new(
                store.clone(),
                config.stripe.webhook_secret.clone(),
            ),
            store,
            gateway,
            environment: config.environment.clone(),
            publishable_key: config.stripe.publishable_key.clone(),
        }
    }
}

/// Builds the notification dispatcher from the email configuration.
///
/// The email API is the primary transport when an API key is set; SMTP is the fallback when
/// both SMTP credentials are set.
pub fn build_dispatcher(email: &EmailConfig) -> notifications::Result<NotificationDispatcher> {
    let mut profile = ShopProfile::default();
    if let Some(user) = &email.smtp_user {
        profile.contact_email = user.clone();
    }

    let mut dispatcher = NotificationDispatcher::new(email.notification_email.clone(), profile);

    if let Some(api_key) = &email.resend_api_key {
        let transport = ResendTransport::new(api_key.clone(), email.from_address.clone())?;
        dispatcher = dispatcher.with_primary(Arc::new(transport));
    }

    if let (Some(username), Some(password)) = (&email.smtp_user, &email.smtp_password) {
        let transport = SmtpTransport::new(&SmtpSettings {
            host: email.smtp_host.clone(),
            port: email.smtp_port,
            username: username.clone(),
            password: password.clone(),
        })?;
        tracing::info!(
            host = %email.smtp_host,
            port = email.smtp_port,
            security = ?transport.security(),
            "SMTP fallback configured"
        );
        dispatcher = dispatcher.with_fallback(Arc::new(transport));
    }

    if email.resend_api_key.is_none() && email.smtp_user.is_none() {
        tracing::warn!("no email transport configured, order notifications will not be delivered");
    }

    Ok(dispatcher)
}
