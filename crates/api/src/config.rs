//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STRIPE_SECRET_KEY` - Payment gateway secret API key
//! - `STRIPE_WEBHOOK_SECRET` - Webhook endpoint signing secret
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 5000)
//! - `APP_ENV` - Environment name reported by `/health` (default: development)
//! - `DATABASE_URL` - `PostgreSQL` connection string; orders are kept in memory when absent
//! - `STRIPE_PUBLISHABLE_KEY` - Public key handed to the checkout page
//! - `RESEND_API_KEY` - Email API key; enables the primary email transport
//! - `EMAIL_FROM` - Sender used by the email API (default: V.A.Y Studio <orders@vay-flowers.com>)
//! - `SMTP_HOST` - SMTP relay (default: smtp.gmail.com)
//! - `SMTP_PORT` - SMTP port (default: 587; 465 uses implicit TLS)
//! - `SMTP_USER` / `SMTP_PASSWORD` - SMTP login; enables the fallback email transport
//! - `NOTIFICATION_EMAIL` - Address that receives new-order alerts
//! - `FRONTEND_URL` - Checkout page origin allowed by CORS
//! - `ALLOWED_ORIGINS` - Additional comma-separated CORS origins

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_EMAIL_FROM: &str = "V.A.Y Studio <orders@vay-flowers.com>";
const DEFAULT_NOTIFICATION_EMAIL: &str = "florist.vay.studio@gmail.com";
const DEFAULT_FRONTEND_URL: &str = "http://127.0.0.1:5500";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// `PostgreSQL` connection URL. Contains credentials.
    pub database_url: Option<SecretString>,
    pub stripe: StripeConfig,
    pub email: EmailConfig,
    pub allowed_origins: Vec<String>,
}

/// Payment gateway configuration.
///
/// Implements `Debug` manually to redact the secret key and webhook secret.
#[derive(Clone)]
pub struct StripeConfig {
    pub publishable_key: String,
    pub secret_key: SecretString,
    pub webhook_secret: SecretString,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("publishable_key", &self.publishable_key)
            .field("secret_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

/// Notification email configuration.
///
/// Implements `Debug` manually to redact credentials.
#[derive(Clone)]
pub struct EmailConfig {
    pub resend_api_key: Option<SecretString>,
    pub from_address: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<SecretString>,
    pub notification_email: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("resend_api_key", &self.resend_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("from_address", &self.from_address)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "[REDACTED]"))
            .field("notification_email", &self.notification_email)
            .finish()
    }
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a port does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let frontend_url = env.or_default("FRONTEND_URL", DEFAULT_FRONTEND_URL);
        let mut allowed_origins = vec![frontend_url];
        if let Some(extra) = env.optional("ALLOWED_ORIGINS") {
            allowed_origins.extend(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string),
            );
        }
        allowed_origins.dedup();

        Ok(Self {
            host: env.or_default("HOST", "0.0.0.0"),
            port: env.port("PORT", DEFAULT_PORT)?,
            environment: env.or_default("APP_ENV", "development"),
            database_url: env
                .optional("DATABASE_URL")
                .map(|url| SecretString::from(normalize_database_url(&url))),
            stripe: StripeConfig {
                publishable_key: env.or_default("STRIPE_PUBLISHABLE_KEY", ""),
                secret_key: env.secret("STRIPE_SECRET_KEY")?,
                webhook_secret: env.secret("STRIPE_WEBHOOK_SECRET")?,
            },
            email: EmailConfig {
                resend_api_key: env.optional("RESEND_API_KEY").map(SecretString::from),
                from_address: env.or_default("EMAIL_FROM", DEFAULT_EMAIL_FROM),
                smtp_host: env.or_default("SMTP_HOST", "smtp.gmail.com"),
                smtp_port: env.port("SMTP_PORT", DEFAULT_SMTP_PORT)?,
                smtp_user: env.optional("SMTP_USER"),
                smtp_password: env.optional("SMTP_PASSWORD").map(SecretString::from),
                notification_email: env
                    .or_default("NOTIFICATION_EMAIL", DEFAULT_NOTIFICATION_EMAIL),
            },
            allowed_origins,
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Rewrites the legacy `postgres://` scheme some hosting platforms hand out.
pub fn normalize_database_url(url: &str) -> String {
    match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{rest}"),
        None => url.to_string(),
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        self.optional(key)
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn port(&self, key: &str, default: u16) -> Result<u16, ConfigError> {
        match self.optional(key) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidEnvVar(key.to_string(), e.to_string())
                }),
            None => Ok(default),
        }
    }
}
