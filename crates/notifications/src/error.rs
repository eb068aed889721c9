use thiserror::Error;

/// Errors that can occur when rendering or sending a notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Email API rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, NotificationError>;
