pub mod config;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod payments;
pub mod webhooks;

use crate::error::ApiError;

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}
